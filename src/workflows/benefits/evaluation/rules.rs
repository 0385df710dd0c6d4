use super::config::PolicyConfig;

/// Tests every exclusion rule against one record's fields. All three rules
/// run even after a match so a record can carry multiple reasons; an absent
/// field never matches its rule.
pub(crate) fn exclusion_reasons(
    role: Option<&str>,
    status: Option<&str>,
    group: Option<&str>,
    policy: &PolicyConfig,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(role) = role {
        if policy.excluded_roles.iter().any(|excluded| excluded == role) {
            reasons.push(format!("role: {role}"));
        }
    }

    if let Some(status) = status {
        if policy
            .excluded_statuses
            .iter()
            .any(|excluded| excluded == status)
        {
            reasons.push(format!("status: {status}"));
        }
    }

    if let Some(group) = group {
        if policy
            .excluded_groups
            .iter()
            .any(|excluded| excluded == group)
        {
            reasons.push(format!("location: {group}"));
        }
    }

    reasons
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Policy sets driving the exclusion rules and the per-group payout
/// adjustment. Always passed into the engine explicitly so tests can
/// substitute policies without touching shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub excluded_roles: Vec<String>,
    pub excluded_statuses: Vec<String>,
    pub excluded_groups: Vec<String>,
    /// Group keys here are also the closed set the per-group summary
    /// breakdown reports over.
    pub group_adjustments: IndexMap<String, f64>,
}

impl PolicyConfig {
    /// The standard benefits policy.
    pub fn standard() -> Self {
        Self {
            excluded_roles: vec![
                "Intern".to_string(),
                "Apprentice".to_string(),
                "Director".to_string(),
            ],
            excluded_statuses: vec!["On Leave".to_string(), "Terminated".to_string()],
            excluded_groups: vec!["Abroad".to_string()],
            group_adjustments: IndexMap::from([
                ("SP".to_string(), 50.0),
                ("RJ".to_string(), 70.0),
                ("PR".to_string(), 60.0),
                ("RS".to_string(), 80.0),
            ]),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_orders_groups_for_reporting() {
        let policy = PolicyConfig::standard();
        let groups: Vec<&String> = policy.group_adjustments.keys().collect();
        assert_eq!(groups, ["SP", "RJ", "PR", "RS"]);
        assert_eq!(policy.group_adjustments.get("SP"), Some(&50.0));
    }
}

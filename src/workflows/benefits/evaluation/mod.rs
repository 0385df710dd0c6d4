mod config;
mod rules;

pub use config::PolicyConfig;

use super::domain::{coerce_amount, BenefitRecord};
use crate::workflows::ingest::columns;
use crate::workflows::ingest::Row;

/// Pure transform from one unified-table row to a computed record. Rule
/// evaluation first, then payout: ineligible records keep explicit zeros
/// for adjustment and final amount.
pub(crate) fn compute_record(row: &Row, policy: &PolicyConfig) -> BenefitRecord {
    let field = |name: &str| row.get(name).map(String::as_str);

    let exclusion_reasons = rules::exclusion_reasons(
        field(columns::ROLE),
        field(columns::STATUS),
        field(columns::GROUP),
        policy,
    );
    let eligible = exclusion_reasons.is_empty();

    let base_amount = coerce_amount(field(columns::BASE_AMOUNT));
    let (adjustment, final_amount) = if eligible {
        let adjustment = field(columns::GROUP)
            .and_then(|group| policy.group_adjustments.get(group))
            .copied()
            .unwrap_or(0.0);
        (adjustment, base_amount + adjustment)
    } else {
        (0.0, 0.0)
    };

    let extras = row
        .iter()
        .filter(|(name, _)| !columns::is_canonical(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    BenefitRecord {
        employee_id: field(columns::EMPLOYEE_ID).map(str::to_string),
        company: field(columns::COMPANY).map(str::to_string),
        role: field(columns::ROLE).map(str::to_string),
        status: field(columns::STATUS).map(str::to_string),
        group: field(columns::GROUP).map(str::to_string),
        base_amount,
        eligible,
        exclusion_reasons,
        adjustment,
        final_amount,
        extras,
    }
}

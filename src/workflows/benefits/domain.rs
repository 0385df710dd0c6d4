use indexmap::IndexMap;
use serde::Serialize;

/// One employee after rule evaluation and payout calculation. Created once
/// from a unified-table row and never mutated afterwards; aggregation only
/// reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitRecord {
    pub employee_id: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub group: Option<String>,
    pub base_amount: f64,
    pub eligible: bool,
    /// Matching exclusion-rule labels in role, status, group check order.
    /// Empty exactly when the record is eligible.
    pub exclusion_reasons: Vec<String>,
    pub adjustment: f64,
    pub final_amount: f64,
    /// Source columns with no canonical mapping, passed through unchanged.
    #[serde(flatten)]
    pub extras: IndexMap<String, String>,
}

/// Coerces a raw cell to a benefit amount. Missing values, parse failures,
/// and non-finite results all default to zero; coercion never fails.
pub(crate) fn coerce_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_amount_parses_plain_numbers() {
        assert_eq!(coerce_amount(Some("100")), 100.0);
        assert_eq!(coerce_amount(Some(" 37.5 ")), 37.5);
    }

    #[test]
    fn coerce_amount_defaults_to_zero_on_bad_input() {
        assert_eq!(coerce_amount(None), 0.0);
        assert_eq!(coerce_amount(Some("")), 0.0);
        assert_eq!(coerce_amount(Some("R$ 100")), 0.0);
        assert_eq!(coerce_amount(Some("NaN")), 0.0);
        assert_eq!(coerce_amount(Some("inf")), 0.0);
    }
}

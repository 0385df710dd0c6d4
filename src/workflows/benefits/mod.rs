mod domain;
mod evaluation;
mod report;

pub use domain::BenefitRecord;
pub use evaluation::PolicyConfig;
pub use report::{BenefitsSummary, ExclusionHistogram, GroupBreakdownEntry};

use crate::workflows::ingest::DataTable;
use std::fmt;

/// Stateless engine applying one policy to unified tables: rule evaluation,
/// payout calculation, then aggregation in a single pass over the result.
pub struct BenefitsEngine {
    policy: PolicyConfig,
}

impl BenefitsEngine {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn with_standard_policy() -> Self {
        Self::new(PolicyConfig::standard())
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Computes every record plus the summary and exclusion-reason
    /// histogram. An empty table is a terminal error, never an empty
    /// summary.
    pub fn evaluate(&self, table: &DataTable) -> Result<BenefitsOutcome, EngineError> {
        if table.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let records: Vec<BenefitRecord> = table
            .rows()
            .iter()
            .map(|row| evaluation::compute_record(row, &self.policy))
            .collect();

        let summary = report::summarize(&records, &self.policy);
        let histogram = report::reason_histogram(&records);

        Ok(BenefitsOutcome {
            records,
            summary,
            histogram,
        })
    }
}

/// Everything the engine produces for one unified table.
#[derive(Debug)]
pub struct BenefitsOutcome {
    pub records: Vec<BenefitRecord>,
    pub summary: BenefitsSummary,
    pub histogram: ExclusionHistogram,
}

#[derive(Debug)]
pub enum EngineError {
    EmptyInput,
    Computation { detail: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyInput => write!(f, "unified table has no rows to evaluate"),
            EngineError::Computation { detail } => {
                write!(f, "benefit computation failed: {detail}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ingest::columns;
    use crate::workflows::ingest::Row;

    fn table(rows: Vec<Vec<(&str, &str)>>) -> DataTable {
        let mut table = DataTable::new();
        for cells in rows {
            let row: Row = cells
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            table.push_row(row);
        }
        table
    }

    #[test]
    fn empty_table_is_a_terminal_error() {
        let engine = BenefitsEngine::with_standard_policy();
        let error = engine.evaluate(&DataTable::new()).expect_err("empty input");
        assert!(matches!(error, EngineError::EmptyInput));
    }

    #[test]
    fn eligibility_and_reasons_stay_consistent() {
        let engine = BenefitsEngine::with_standard_policy();
        let outcome = engine
            .evaluate(&table(vec![
                vec![(columns::ROLE, "Analyst"), (columns::GROUP, "SP")],
                vec![(columns::ROLE, "Intern")],
                vec![(columns::STATUS, "Terminated"), (columns::GROUP, "Abroad")],
            ]))
            .expect("evaluation succeeds");

        for record in &outcome.records {
            assert_eq!(record.eligible, record.exclusion_reasons.is_empty());
            if !record.eligible {
                assert_eq!(record.adjustment, 0.0);
                assert_eq!(record.final_amount, 0.0);
            }
        }

        assert_eq!(outcome.summary.total_count, 3);
        assert_eq!(outcome.summary.eligible_count, 1);
        assert_eq!(outcome.histogram.values().sum::<usize>(), 3);
    }

    #[test]
    fn substitute_policies_change_the_outcome() {
        let mut policy = PolicyConfig::standard();
        policy.excluded_roles = vec!["Analyst".to_string()];

        let engine = BenefitsEngine::new(policy);
        let outcome = engine
            .evaluate(&table(vec![vec![(columns::ROLE, "Analyst")]]))
            .expect("evaluation succeeds");

        assert!(!outcome.records[0].eligible);
        assert_eq!(outcome.records[0].exclusion_reasons, vec!["role: Analyst"]);
    }

    #[test]
    fn summary_sum_matches_eligible_final_amounts() {
        let engine = BenefitsEngine::with_standard_policy();
        let outcome = engine
            .evaluate(&table(vec![
                vec![(columns::GROUP, "SP"), (columns::BASE_AMOUNT, "100")],
                vec![(columns::GROUP, "RS"), (columns::BASE_AMOUNT, "20")],
                vec![(columns::ROLE, "Director"), (columns::BASE_AMOUNT, "999")],
            ]))
            .expect("evaluation succeeds");

        let eligible_sum: f64 = outcome
            .records
            .iter()
            .filter(|record| record.eligible)
            .map(|record| record.final_amount)
            .sum();
        assert_eq!(outcome.summary.total_amount, eligible_sum);
        assert_eq!(outcome.summary.total_amount, 250.0);
    }
}

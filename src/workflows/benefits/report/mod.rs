use super::domain::BenefitRecord;
use super::evaluation::PolicyConfig;
use indexmap::IndexMap;
use serde::Serialize;

/// Count of occurrences per distinct exclusion reason, keyed in first-seen
/// order across the ineligible records.
pub type ExclusionHistogram = IndexMap<String, usize>;

/// Aggregate view over the fully computed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitsSummary {
    pub total_count: usize,
    pub eligible_count: usize,
    pub ineligible_count: usize,
    /// Sum of `final_amount` over eligible records.
    pub total_amount: f64,
    pub group_breakdown: Vec<GroupBreakdownEntry>,
}

/// Eligible headcount and payout within one policy group. The breakdown
/// covers exactly the groups named in the policy adjustment table; group
/// values seen only in the data are not reported here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdownEntry {
    pub group: String,
    pub eligible_count: usize,
    pub total_amount: f64,
}

pub(crate) fn summarize(records: &[BenefitRecord], policy: &PolicyConfig) -> BenefitsSummary {
    let mut eligible_count = 0;
    let mut total_amount = 0.0;
    let mut groups: IndexMap<&str, (usize, f64)> = policy
        .group_adjustments
        .keys()
        .map(|group| (group.as_str(), (0, 0.0)))
        .collect();

    for record in records {
        if !record.eligible {
            continue;
        }
        eligible_count += 1;
        total_amount += record.final_amount;

        if let Some(tally) = record
            .group
            .as_deref()
            .and_then(|group| groups.get_mut(group))
        {
            tally.0 += 1;
            tally.1 += record.final_amount;
        }
    }

    let group_breakdown = groups
        .into_iter()
        .map(|(group, (count, amount))| GroupBreakdownEntry {
            group: group.to_string(),
            eligible_count: count,
            total_amount: amount,
        })
        .collect();

    BenefitsSummary {
        total_count: records.len(),
        eligible_count,
        ineligible_count: records.len() - eligible_count,
        total_amount,
        group_breakdown,
    }
}

pub(crate) fn reason_histogram(records: &[BenefitRecord]) -> ExclusionHistogram {
    let mut histogram = ExclusionHistogram::new();
    for record in records.iter().filter(|record| !record.eligible) {
        for reason in &record.exclusion_reasons {
            *histogram.entry(reason.clone()).or_insert(0) += 1;
        }
    }
    histogram
}

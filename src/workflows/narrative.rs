use crate::workflows::benefits::{BenefitsSummary, ExclusionHistogram, PolicyConfig};
use serde::Serialize;
use std::fmt;

/// External collaborator turning computed results into free text. The core
/// never requires one: availability is a probe, and every failure degrades
/// to a placeholder for that one section only.
pub trait NarrativeGenerator {
    fn is_available(&self) -> bool;
    fn detailed_analysis(&self, context: &str) -> Result<String, NarrativeError>;
    fn executive_summary(&self, context: &str) -> Result<String, NarrativeError>;
    fn eligibility_explanation(&self, policy: &PolicyConfig) -> Result<String, NarrativeError>;
}

/// The three narrative pieces the original analysis flow produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeSections {
    pub detailed_analysis: String,
    pub executive_summary: String,
    pub eligibility_explanation: String,
}

pub const NARRATIVE_UNAVAILABLE: &str =
    "Narrative generation is not configured; computed results are unaffected.";

/// Renders all three sections, substituting a placeholder wherever the
/// collaborator is unavailable or a single sub-request fails. The computed
/// table and summary are never invalidated by narrative problems.
pub fn generate_sections(
    generator: &dyn NarrativeGenerator,
    summary: &BenefitsSummary,
    histogram: &ExclusionHistogram,
    policy: &PolicyConfig,
) -> NarrativeSections {
    if !generator.is_available() {
        return NarrativeSections {
            detailed_analysis: NARRATIVE_UNAVAILABLE.to_string(),
            executive_summary: NARRATIVE_UNAVAILABLE.to_string(),
            eligibility_explanation: NARRATIVE_UNAVAILABLE.to_string(),
        };
    }

    let context = summary_context(summary, histogram);

    NarrativeSections {
        detailed_analysis: generator
            .detailed_analysis(&context)
            .unwrap_or_else(|err| placeholder("detailed analysis", &err)),
        executive_summary: generator
            .executive_summary(&context)
            .unwrap_or_else(|err| placeholder("executive summary", &err)),
        eligibility_explanation: generator
            .eligibility_explanation(policy)
            .unwrap_or_else(|err| placeholder("eligibility explanation", &err)),
    }
}

fn placeholder(section: &str, error: &NarrativeError) -> String {
    format!("The {section} could not be generated: {error}")
}

/// Plain-text rendering of the aggregates, handed to the collaborator as
/// read-only input.
pub fn summary_context(summary: &BenefitsSummary, histogram: &ExclusionHistogram) -> String {
    let mut lines = vec![
        format!("Total employees: {}", summary.total_count),
        format!("Eligible employees: {}", summary.eligible_count),
        format!("Ineligible employees: {}", summary.ineligible_count),
        format!("Total benefit amount: {:.2}", summary.total_amount),
        String::new(),
        "Breakdown by group:".to_string(),
    ];

    for entry in &summary.group_breakdown {
        lines.push(format!(
            "- {}: {} employees, total {:.2}",
            entry.group, entry.eligible_count, entry.total_amount
        ));
    }

    lines.push(String::new());
    if histogram.is_empty() {
        lines.push("Exclusion reasons: none".to_string());
    } else {
        lines.push("Exclusion reasons:".to_string());
        for (reason, count) in histogram {
            lines.push(format!("- {}: {} employees", reason, count));
        }
    }

    lines.join("\n")
}

/// Stand-in used when no collaborator is wired up.
pub struct UnavailableNarrator;

impl NarrativeGenerator for UnavailableNarrator {
    fn is_available(&self) -> bool {
        false
    }

    fn detailed_analysis(&self, _context: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }

    fn executive_summary(&self, _context: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }

    fn eligibility_explanation(&self, _policy: &PolicyConfig) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }
}

#[derive(Debug)]
pub enum NarrativeError {
    Unavailable,
    Generation { detail: String },
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeError::Unavailable => write!(f, "no narrative collaborator is configured"),
            NarrativeError::Generation { detail } => {
                write!(f, "narrative generation failed: {detail}")
            }
        }
    }
}

impl std::error::Error for NarrativeError {}

use crate::workflows::benefits::{
    BenefitRecord, BenefitsEngine, BenefitsOutcome, BenefitsSummary, EngineError,
    ExclusionHistogram, PolicyConfig,
};
use crate::workflows::ingest::{BundleIngestor, IngestDiagnostics, IngestError, SourceBundle};
use crate::workflows::narrative::{self, NarrativeGenerator, NarrativeSections};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Sequential composition of ingestion and the benefits engine with an
/// early exit: if ingestion fails the engine never runs, and there is no
/// partial-success path.
pub struct BenefitsPipeline {
    engine: BenefitsEngine,
}

impl BenefitsPipeline {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            engine: BenefitsEngine::new(policy),
        }
    }

    pub fn with_standard_policy() -> Self {
        Self::new(PolicyConfig::standard())
    }

    pub fn policy(&self) -> &PolicyConfig {
        self.engine.policy()
    }

    pub fn process(&self, bundle: SourceBundle) -> Result<PipelineOutput, PipelineError> {
        let ingested = BundleIngestor::ingest(bundle)?;
        info!(
            files_read = ingested.diagnostics.files_read,
            files_skipped = ingested.diagnostics.files_skipped,
            records = ingested.diagnostics.total_records,
            "bundle unified"
        );

        let BenefitsOutcome {
            records,
            summary,
            histogram,
        } = self.engine.evaluate(&ingested.table)?;

        Ok(PipelineOutput {
            records,
            summary,
            histogram,
            diagnostics: ingested.diagnostics,
            narrative: None,
        })
    }

    /// Same as [`process`](Self::process), then asks the collaborator for
    /// narrative sections. Narrative problems never fail the pipeline.
    pub fn process_with_narrative(
        &self,
        bundle: SourceBundle,
        generator: &dyn NarrativeGenerator,
    ) -> Result<PipelineOutput, PipelineError> {
        let mut output = self.process(bundle)?;
        output.narrative = Some(narrative::generate_sections(
            generator,
            &output.summary,
            &output.histogram,
            self.engine.policy(),
        ));
        Ok(output)
    }
}

/// Full result of a successful run.
#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    pub records: Vec<BenefitRecord>,
    pub summary: BenefitsSummary,
    pub histogram: ExclusionHistogram,
    pub diagnostics: IngestDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeSections>,
}

#[derive(Debug)]
pub enum PipelineError {
    Ingest(IngestError),
    Engine(EngineError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "{}", err),
            PipelineError::Engine(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Engine(err) => Some(err),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<EngineError> for PipelineError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Tagged result for external consumers. On failure every computed field is
/// left at its empty default and `error` carries the single descriptor; on
/// success `error` is absent.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub success: bool,
    pub records: Vec<BenefitRecord>,
    pub summary: Option<BenefitsSummary>,
    pub histogram: ExclusionHistogram,
    pub diagnostics: Option<IngestDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeSections>,
    pub error: Option<String>,
}

impl From<Result<PipelineOutput, PipelineError>> for ProcessReport {
    fn from(result: Result<PipelineOutput, PipelineError>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                records: output.records,
                summary: Some(output.summary),
                histogram: output.histogram,
                diagnostics: Some(output.diagnostics),
                narrative: output.narrative,
                error: None,
            },
            Err(error) => Self {
                success: false,
                records: Vec::new(),
                summary: None,
                histogram: ExclusionHistogram::new(),
                diagnostics: None,
                narrative: None,
                error: Some(error.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ingest::SourceFile;
    use crate::workflows::narrative::{UnavailableNarrator, NARRATIVE_UNAVAILABLE};

    fn bundle(files: &[(&str, &str)]) -> SourceBundle {
        SourceBundle::from_files(
            files
                .iter()
                .map(|(name, contents)| SourceFile::new(*name, contents.as_bytes().to_vec()))
                .collect(),
        )
    }

    #[test]
    fn ingestion_failure_skips_the_engine_and_propagates() {
        let pipeline = BenefitsPipeline::with_standard_policy();
        let error = pipeline
            .process(bundle(&[]))
            .expect_err("empty bundle fails");
        assert!(matches!(
            error,
            PipelineError::Ingest(IngestError::NoValidTables)
        ));
    }

    #[test]
    fn successful_run_carries_all_three_outputs() {
        let pipeline = BenefitsPipeline::with_standard_policy();
        let output = pipeline
            .process(bundle(&[(
                "people.csv",
                "id,role,union,base amount\n1,Analyst,SP,100\n2,Intern,SP,100\n",
            )]))
            .expect("pipeline succeeds");

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.summary.total_count, 2);
        assert_eq!(output.histogram.len(), 1);
        assert!(output.narrative.is_none());
    }

    #[test]
    fn narrative_unavailability_is_not_an_error() {
        let pipeline = BenefitsPipeline::with_standard_policy();
        let output = pipeline
            .process_with_narrative(
                bundle(&[("people.csv", "id,role\n1,Analyst\n")]),
                &UnavailableNarrator,
            )
            .expect("pipeline succeeds");

        let narrative = output.narrative.expect("sections present");
        assert_eq!(narrative.detailed_analysis, NARRATIVE_UNAVAILABLE);
    }

    #[test]
    fn failed_report_has_empty_defaults_and_an_error() {
        let pipeline = BenefitsPipeline::with_standard_policy();
        let report = ProcessReport::from(pipeline.process(bundle(&[])));

        assert!(!report.success);
        assert!(report.records.is_empty());
        assert!(report.summary.is_none());
        assert!(report.histogram.is_empty());
        assert!(report.error.is_some());
    }

    #[test]
    fn successful_report_has_no_error() {
        let pipeline = BenefitsPipeline::with_standard_policy();
        let report =
            ProcessReport::from(pipeline.process(bundle(&[("people.csv", "id\n1\n")])));

        assert!(report.success);
        assert!(report.error.is_none());
        assert!(report.summary.is_some());
    }
}

mod bundle;
pub mod columns;
mod normalizer;
mod parser;
mod table;

pub use bundle::{ExtractionError, SourceBundle, SourceFile};
pub use table::{DataTable, Row};

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Extracts every tabular file from a bundle and unifies them into one
/// deduplicated table.
pub struct BundleIngestor;

impl BundleIngestor {
    /// Parses each file independently, skipping unreadable or empty ones,
    /// concatenates the survivors as a column union, and deduplicates by
    /// employee id with the first occurrence winning.
    pub fn ingest(bundle: SourceBundle) -> Result<IngestOutcome, IngestError> {
        let mut unified = DataTable::new();
        let mut files_read = 0;
        let mut files_skipped = 0;

        for file in bundle.files() {
            match parser::parse_source_file(file) {
                Ok(table) if !table.is_empty() => {
                    files_read += 1;
                    unified.absorb(table);
                }
                Ok(_) => {
                    files_skipped += 1;
                    warn!(file = %file.name, "skipping source file with no data rows");
                }
                Err(error) => {
                    files_skipped += 1;
                    warn!(file = %file.name, %error, "skipping unreadable source file");
                }
            }
        }

        if unified.is_empty() {
            return Err(IngestError::NoValidTables);
        }

        let table = dedup_by_employee_id(unified);
        let diagnostics = IngestDiagnostics {
            files_read,
            files_skipped,
            total_records: table.len(),
            columns: table.columns().to_vec(),
        };

        Ok(IngestOutcome { table, diagnostics })
    }
}

/// Keeps the first row seen for each employee id. Rows without an id are
/// never considered duplicates of each other and are all retained. A no-op
/// when no file contributed an id column.
fn dedup_by_employee_id(table: DataTable) -> DataTable {
    if !table.has_column(columns::EMPLOYEE_ID) {
        return table;
    }

    let columns = table.columns().to_vec();
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(table.len());

    for row in table.rows() {
        match row.get(columns::EMPLOYEE_ID) {
            Some(id) => {
                if seen.insert(id.clone()) {
                    rows.push(row.clone());
                }
            }
            None => rows.push(row.clone()),
        }
    }

    DataTable::from_parts(columns, rows)
}

/// Unified table plus the metadata the original upload flow reported.
#[derive(Debug)]
pub struct IngestOutcome {
    pub table: DataTable,
    pub diagnostics: IngestDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestDiagnostics {
    pub files_read: usize,
    pub files_skipped: usize,
    pub total_records: usize,
    pub columns: Vec<String>,
}

#[derive(Debug)]
pub enum IngestError {
    Extraction(ExtractionError),
    NoValidTables,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Extraction(err) => write!(f, "could not open source bundle: {}", err),
            IngestError::NoValidTables => {
                write!(f, "no usable tabular files found in the bundle")
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Extraction(err) => Some(err),
            IngestError::NoValidTables => None,
        }
    }
}

impl From<ExtractionError> for IngestError {
    fn from(value: ExtractionError) -> Self {
        Self::Extraction(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_source(name: &str, contents: &str) -> SourceFile {
        SourceFile::new(name, contents.as_bytes().to_vec())
    }

    #[test]
    fn unifies_files_with_different_column_spellings() {
        let bundle = SourceBundle::from_files(vec![
            csv_source("a.csv", "MATRICULA,Job Title\n1,Analyst\n"),
            csv_source("b.csv", "employee id,Sindicato\n2,SP\n"),
        ]);

        let outcome = BundleIngestor::ingest(bundle).expect("ingest succeeds");
        assert_eq!(outcome.table.len(), 2);
        assert!(outcome.table.has_column(columns::EMPLOYEE_ID));
        assert!(outcome.table.has_column(columns::ROLE));
        assert!(outcome.table.has_column(columns::GROUP));
        assert_eq!(outcome.diagnostics.files_read, 2);
        assert_eq!(outcome.diagnostics.files_skipped, 0);
        assert_eq!(outcome.diagnostics.total_records, 2);
    }

    #[test]
    fn first_occurrence_wins_on_duplicate_ids() {
        let bundle = SourceBundle::from_files(vec![
            csv_source("first.csv", "id,role\n42,Analyst\n"),
            csv_source("second.csv", "id,role\n42,Director\n43,Clerk\n"),
        ]);

        let outcome = BundleIngestor::ingest(bundle).expect("ingest succeeds");
        assert_eq!(outcome.table.len(), 2);

        let kept = &outcome.table.rows()[0];
        assert_eq!(kept.get(columns::ROLE).map(String::as_str), Some("Analyst"));
    }

    #[test]
    fn rows_without_an_id_are_never_deduplicated() {
        let bundle = SourceBundle::from_files(vec![csv_source(
            "mixed.csv",
            "id,role\n42,Analyst\n,Clerk\n,Clerk\n",
        )]);

        let outcome = BundleIngestor::ingest(bundle).expect("ingest succeeds");
        assert_eq!(outcome.table.len(), 3);
    }

    #[test]
    fn unreadable_files_are_skipped_not_fatal() {
        let bundle = SourceBundle::from_files(vec![
            csv_source("good.csv", "id\n1\n"),
            SourceFile::new("broken.xlsx", b"not a workbook".to_vec()),
        ]);

        let outcome = BundleIngestor::ingest(bundle).expect("ingest succeeds");
        assert_eq!(outcome.diagnostics.files_read, 1);
        assert_eq!(outcome.diagnostics.files_skipped, 1);
    }

    #[test]
    fn all_empty_files_fail_with_no_valid_tables() {
        let bundle = SourceBundle::from_files(vec![
            csv_source("empty.csv", ""),
            csv_source("header_only.csv", "id,role\n"),
        ]);

        let error = BundleIngestor::ingest(bundle).expect_err("nothing usable");
        assert!(matches!(error, IngestError::NoValidTables));
    }

    #[test]
    fn empty_bundle_fails_with_no_valid_tables() {
        let error =
            BundleIngestor::ingest(SourceBundle::default()).expect_err("empty bundle rejected");
        assert!(matches!(error, IngestError::NoValidTables));
    }
}

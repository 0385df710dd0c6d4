use super::bundle::SourceFile;
use super::normalizer::canonical_column;
use super::table::{DataTable, Row};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::fmt;
use std::io::Cursor;

/// Parses one source file into a table with normalized column names. Blank
/// cells are dropped rather than stored as empty strings, so a missing value
/// and a blank value look identical downstream.
pub(crate) fn parse_source_file(file: &SourceFile) -> Result<DataTable, ParseError> {
    match file.extension().as_deref() {
        Some("csv") => parse_delimited(&file.contents),
        Some("xlsx") | Some("xls") => parse_workbook(&file.contents),
        other => Err(ParseError::Unsupported {
            extension: other.unwrap_or("").to_string(),
        }),
    }
}

fn parse_delimited(contents: &[u8]) -> Result<DataTable, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents);

    let headers: Vec<String> = reader
        .headers()
        .map_err(ParseError::Csv)?
        .iter()
        .map(canonical_column)
        .collect();

    let mut table = DataTable::new();
    for record in reader.records() {
        let record = record.map_err(ParseError::Csv)?;
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            row.insert(header.clone(), cell.to_string());
        }
        table.push_row(row);
    }

    Ok(table)
}

fn parse_workbook(contents: &[u8]) -> Result<DataTable, ParseError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(contents)).map_err(ParseError::Workbook)?;

    // Mirrors delimited handling: only the first sheet carries data.
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(ParseError::Workbook)?,
        None => return Ok(DataTable::new()),
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| match cell_to_string(cell) {
                Some(text) => canonical_column(&text),
                None => String::new(),
            })
            .collect(),
        None => return Ok(DataTable::new()),
    };

    let mut table = DataTable::new();
    for sheet_row in rows {
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(sheet_row.iter()) {
            if header.is_empty() {
                continue;
            }
            if let Some(text) = cell_to_string(cell) {
                row.insert(header.clone(), text);
            }
        }
        if !row.is_empty() {
            table.push_row(row);
        }
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(value) => Some(format_number(*value)),
        Data::Int(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => Some(format_number(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(text.clone()),
    }
}

/// Spreadsheet numerics come back as floats; identifiers like employee
/// numbers must not grow a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug)]
pub(crate) enum ParseError {
    Csv(csv::Error),
    Workbook(calamine::Error),
    Unsupported { extension: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Csv(err) => write!(f, "invalid delimited data: {}", err),
            ParseError::Workbook(err) => write!(f, "invalid workbook data: {}", err),
            ParseError::Unsupported { extension } => {
                write!(f, "unsupported tabular format '{}'", extension)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Csv(err) => Some(err),
            ParseError::Workbook(err) => Some(err),
            ParseError::Unsupported { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::columns;
    use super::*;

    fn csv_file(contents: &str) -> SourceFile {
        SourceFile::new("people.csv", contents.as_bytes().to_vec())
    }

    #[test]
    fn delimited_rows_use_canonical_headers() {
        let table = parse_source_file(&csv_file(
            "MATRICULA,Job Title,Sindicato,Nome\n42,Analyst,SP,Ana\n",
        ))
        .expect("csv parses");

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.get(columns::EMPLOYEE_ID).map(String::as_str), Some("42"));
        assert_eq!(row.get(columns::ROLE).map(String::as_str), Some("Analyst"));
        assert_eq!(row.get(columns::GROUP).map(String::as_str), Some("SP"));
        assert_eq!(row.get("Nome").map(String::as_str), Some("Ana"));
    }

    #[test]
    fn blank_cells_become_absent_values() {
        let table = parse_source_file(&csv_file("id,status\n42,\n43,Active\n")).expect("parses");

        assert_eq!(table.rows()[0].get(columns::STATUS), None);
        assert_eq!(
            table.rows()[1].get(columns::STATUS).map(String::as_str),
            Some("Active")
        );
    }

    #[test]
    fn empty_file_yields_empty_table() {
        let table = parse_source_file(&csv_file("")).expect("empty csv parses");
        assert!(table.is_empty());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = SourceFile::new("notes.txt", b"id\n1\n".to_vec());
        let error = parse_source_file(&file).expect_err("txt rejected");
        assert!(matches!(error, ParseError::Unsupported { .. }));
    }

    #[test]
    fn numeric_formatting_drops_integer_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(37.5), "37.5");
    }
}

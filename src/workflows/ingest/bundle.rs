use std::fmt;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const TABULAR_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// A single named file pulled out of a bundle, still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    pub(crate) fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    fn is_tabular(&self) -> bool {
        self.extension()
            .map(|ext| TABULAR_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

/// The uploaded input: an ordered list of tabular source files. Order is the
/// bundle's deterministic enumeration order (archive entry order, or sorted
/// file names for a directory) and drives first-occurrence-wins
/// deduplication downstream.
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    files: Vec<SourceFile>,
}

impl SourceBundle {
    /// Builds a bundle from already-loaded files, keeping only tabular
    /// entries. Useful for tests and in-process callers.
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self {
            files: files.into_iter().filter(SourceFile::is_tabular).collect(),
        }
    }

    /// Opens a ZIP archive held in memory. Nested directories are walked;
    /// non-tabular entries are ignored.
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Self, ExtractionError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ExtractionError::Zip)?;
        let mut files = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(ExtractionError::Zip)?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut contents)
                .map_err(ExtractionError::Io)?;
            files.push(SourceFile::new(name, contents));
        }

        Ok(Self::from_files(files))
    }

    /// Reads every tabular file directly under a directory, sorted by name
    /// so the enumeration order is stable.
    pub fn from_dir(path: &Path) -> Result<Self, ExtractionError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(ExtractionError::Io)? {
            let entry = entry.map_err(ExtractionError::Io)?;
            if entry.file_type().map_err(ExtractionError::Io)?.is_file() {
                names.push(entry.path());
            }
        }
        names.sort();

        let mut files = Vec::new();
        for path in names {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let contents = fs::read(&path).map_err(ExtractionError::Io)?;
            files.push(SourceFile::new(name, contents));
        }

        Ok(Self::from_files(files))
    }

    /// Dispatches on the path: a directory is read in place, anything else is
    /// treated as a ZIP archive.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        if path.is_dir() {
            return Self::from_dir(path);
        }

        let bytes = fs::read(path).map_err(ExtractionError::Io)?;
        Self::from_zip_bytes(&bytes)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The bundle itself could not be opened. Per-file parse problems are not
/// extraction errors; they are handled during ingestion.
#[derive(Debug)]
pub enum ExtractionError {
    Zip(ZipError),
    Io(std::io::Error),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::Zip(err) => write!(f, "could not open bundle archive: {}", err),
            ExtractionError::Io(err) => write!(f, "could not read bundle contents: {}", err),
        }
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::Zip(err) => Some(err),
            ExtractionError::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer.write_all(contents).expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn zip_extraction_keeps_entry_order_and_drops_non_tabular_files() {
        let bytes = zip_with(&[
            ("b.csv", b"id\n1\n"),
            ("readme.txt", b"ignore me"),
            ("a.csv", b"id\n2\n"),
        ]);

        let bundle = SourceBundle::from_zip_bytes(&bytes).expect("bundle opens");
        let names: Vec<&str> = bundle.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.csv", "a.csv"]);
    }

    #[test]
    fn corrupt_archive_reports_extraction_error() {
        let error = SourceBundle::from_zip_bytes(b"definitely not a zip")
            .expect_err("corrupt archive rejected");
        assert!(matches!(error, ExtractionError::Zip(_)));
    }

    #[test]
    fn in_memory_bundle_filters_by_extension() {
        let bundle = SourceBundle::from_files(vec![
            SourceFile::new("people.XLSX", vec![1, 2, 3]),
            SourceFile::new("notes.md", vec![4]),
            SourceFile::new("no_extension", vec![5]),
        ]);

        assert_eq!(bundle.files().len(), 1);
        assert_eq!(bundle.files()[0].name, "people.XLSX");
    }
}

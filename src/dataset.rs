//! Loading governance CSV files into memory

use crate::error::{GovernanceError, Result};
use crate::schema::{columns, DataSchema};
use crate::types::GovernanceRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const IN_MEMORY: &str = "<memory>";

/// Rows of a governance file, parsed against a fixed layout
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    schema: DataSchema,
    records: Vec<GovernanceRecord>,
}

impl Dataset {
    /// Load a comma separated file with a header row.
    ///
    /// A header that differs from `schema` yields `SchemaMismatch`; any
    /// problem with the file or an individual row yields `DataFormat`
    /// with the 1-based data row index.
    pub fn load<P: AsRef<Path>>(path: P, schema: &DataSchema) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .map_err(|e| GovernanceError::data_format(path, None, format!("cannot open file: {e}")))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = reader
            .headers()
            .map_err(|e| GovernanceError::data_format(path, None, format!("unreadable header: {e}")))?
            .clone();

        if header.is_empty() {
            return Err(GovernanceError::data_format(path, None, "file has no header row"));
        }

        schema
            .check_header(&header)
            .map_err(|message| GovernanceError::schema_mismatch(path, message))?;

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = index + 1;
            let fields = result
                .map_err(|e| GovernanceError::data_format(path, Some(row), e.to_string()))?;
            let parsed = schema
                .parse_row(&fields)
                .map_err(|message| GovernanceError::data_format(path, Some(row), message))?;
            let record = GovernanceRecord::from_row(&parsed).ok_or_else(|| {
                GovernanceError::data_format(path, Some(row), "row lacks a governance column")
            })?;
            records.push(record);
        }

        info!(path = %path.display(), rows = records.len(), "Dataset loaded");

        Ok(Self {
            source: path.to_path_buf(),
            schema: schema.clone(),
            records,
        })
    }

    /// Wrap records built in memory, using the canonical layout
    pub fn from_records(records: Vec<GovernanceRecord>) -> Self {
        Self {
            source: PathBuf::from(IN_MEMORY),
            schema: DataSchema::governance(),
            records,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn schema(&self) -> &DataSchema {
        &self.schema
    }

    pub fn records(&self) -> &[GovernanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels of every row; fails on the first unlabeled row
    pub fn labels(&self) -> Result<Vec<bool>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record.label.ok_or_else(|| {
                    GovernanceError::data_format(
                        &self.source,
                        Some(index + 1),
                        format!("missing {} label", columns::LABEL),
                    )
                })
            })
            .collect()
    }

    /// First `count` rows
    pub fn preview(&self, count: usize) -> &[GovernanceRecord] {
        let preview = &self.records[..count.min(self.records.len())];
        for (index, record) in preview.iter().enumerate() {
            debug!(row = index + 1, record = ?record, "Preview");
        }
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Tenant,Track,Age,Security,Activity,Protection,Usage,Change,GoodBad,Description";

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_csv(&format!(
            "{HEADER}\ncontoso,Security,1,1,1,1,1,1,true,\"healthy, well kept\"\nfabrikam,Usage,0,0,0,0,0,0,false,\n"
        ));
        let dataset = Dataset::load(file.path(), &DataSchema::governance()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].description, "healthy, well kept");
        assert_eq!(dataset.labels().unwrap(), vec![true, false]);
        assert_eq!(dataset.preview(10).len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load("does/not/exist.csv", &DataSchema::governance()).unwrap_err();
        assert!(matches!(err, GovernanceError::DataFormat { row: None, .. }));
    }

    #[test]
    fn test_short_row_reports_row_index() {
        let file = write_csv(&format!(
            "{HEADER}\nt,k,1,1,1,1,1,1,true,ok\nt,k,1,1,1,1,1,true,short\n"
        ));
        let err = Dataset::load(file.path(), &DataSchema::governance()).unwrap_err();
        assert!(matches!(err, GovernanceError::DataFormat { row: Some(2), .. }));
    }

    #[test]
    fn test_non_numeric_value() {
        let file = write_csv(&format!("{HEADER}\nt,k,1,high,1,1,1,1,true,\n"));
        let err = Dataset::load(file.path(), &DataSchema::governance()).unwrap_err();
        match err {
            GovernanceError::DataFormat { row, message, .. } => {
                assert_eq!(row, Some(1));
                assert!(message.contains("Security"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_header_mismatch() {
        let file = write_csv(
            "Tenant,Track,Age,Security,Activity,Protection,Usage,Change,Result,Description\n",
        );
        let err = Dataset::load(file.path(), &DataSchema::governance()).unwrap_err();
        assert!(matches!(err, GovernanceError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_empty_file() {
        let file = write_csv("");
        let err = Dataset::load(file.path(), &DataSchema::governance()).unwrap_err();
        assert!(matches!(err, GovernanceError::DataFormat { .. }));
    }

    #[test]
    fn test_unlabeled_row() {
        let file = write_csv(&format!("{HEADER}\nt,k,1,1,1,1,1,1,true,\nt,k,0,0,0,0,0,0,,\n"));
        let dataset = Dataset::load(file.path(), &DataSchema::governance()).unwrap();
        let err = dataset.labels().unwrap_err();
        assert!(matches!(err, GovernanceError::DataFormat { row: Some(2), .. }));
    }
}

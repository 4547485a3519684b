//! Positional column layout of governance CSV files.
//!
//! The layout is an explicit ordered list of `(name, type, position)`
//! entries. [`DataSchema::parse_row`] is a generic row parser driven by
//! that list; mapping parsed values onto a [`GovernanceRecord`] happens in
//! the record type itself.
//!
//! [`GovernanceRecord`]: crate::types::GovernanceRecord

use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Version of the canonical layout, persisted alongside trained models.
pub const SCHEMA_VERSION: u32 = 1;

/// Canonical column names
pub mod columns {
    pub const TENANT: &str = "Tenant";
    pub const TRACK: &str = "Track";
    pub const AGE: &str = "Age";
    pub const SECURITY: &str = "Security";
    pub const ACTIVITY: &str = "Activity";
    pub const PROTECTION: &str = "Protection";
    pub const USAGE: &str = "Usage";
    pub const CHANGE: &str = "Change";
    pub const LABEL: &str = "GoodBad";
    pub const DESCRIPTION: &str = "Description";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Float,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnType,
    pub position: usize,
}

impl ColumnDef {
    fn new(name: &str, kind: ColumnType, position: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position,
        }
    }
}

/// Ordered column layout of a data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSchema {
    pub version: u32,
    columns: Vec<ColumnDef>,
}

/// A single parsed cell
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f32),
    /// `None` for an empty cell
    Boolean(Option<bool>),
}

/// Cells of one row, addressable by column name
#[derive(Debug)]
pub struct ParsedRow<'a> {
    schema: &'a DataSchema,
    values: Vec<FieldValue>,
}

impl<'a> ParsedRow<'a> {
    fn value(&self, name: &str) -> Option<&FieldValue> {
        let index = self.schema.columns.iter().position(|c| c.name == name)?;
        self.values.get(index)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name)? {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.value(name)? {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.value(name)? {
            FieldValue::Boolean(v) => *v,
            _ => None,
        }
    }
}

impl DataSchema {
    /// The canonical 10-column governance layout:
    /// `Tenant,Track,Age,Security,Activity,Protection,Usage,Change,GoodBad,Description`
    pub fn governance() -> Self {
        use columns::*;
        use ColumnType::*;

        let layout = [
            (TENANT, Text),
            (TRACK, Text),
            (AGE, Float),
            (SECURITY, Float),
            (ACTIVITY, Float),
            (PROTECTION, Float),
            (USAGE, Float),
            (CHANGE, Float),
            (LABEL, Boolean),
            (DESCRIPTION, Text),
        ];

        Self {
            version: SCHEMA_VERSION,
            columns: layout
                .iter()
                .enumerate()
                .map(|(position, (name, kind))| ColumnDef::new(name, *kind, position))
                .collect(),
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Compare a file header against this layout, position by position.
    pub fn check_header(&self, header: &StringRecord) -> Result<(), String> {
        if header.len() != self.columns.len() {
            return Err(format!(
                "expected {} columns ({}), found {} ({})",
                self.columns.len(),
                self.header().join(","),
                header.len(),
                header.iter().collect::<Vec<_>>().join(",")
            ));
        }

        for column in &self.columns {
            let found = header.get(column.position).unwrap_or_default().trim();
            if !found.eq_ignore_ascii_case(&column.name) {
                return Err(format!(
                    "column {} should be '{}', found '{}'",
                    column.position, column.name, found
                ));
            }
        }

        Ok(())
    }

    /// Parse one data row according to the column types.
    pub fn parse_row(&self, record: &StringRecord) -> Result<ParsedRow<'_>, String> {
        if record.len() != self.columns.len() {
            return Err(format!(
                "expected {} columns, found {}",
                self.columns.len(),
                record.len()
            ));
        }

        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let raw = record.get(column.position).unwrap_or_default();
            let value = match column.kind {
                ColumnType::Text => FieldValue::Text(raw.to_string()),
                ColumnType::Float => FieldValue::Float(parse_float(raw).ok_or_else(|| {
                    format!("column '{}' is not a number: '{}'", column.name, raw)
                })?),
                ColumnType::Boolean => {
                    let token = raw.trim();
                    if token.is_empty() {
                        FieldValue::Boolean(None)
                    } else {
                        FieldValue::Boolean(Some(parse_bool(token).ok_or_else(|| {
                            format!("column '{}' is not a boolean: '{}'", column.name, raw)
                        })?))
                    }
                }
            };
            values.push(value);
        }

        Ok(ParsedRow {
            schema: self,
            values,
        })
    }
}

fn parse_float(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse a boolean label token.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `good/bad`, ignoring case.
pub fn parse_bool(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "good" => Some(true),
        "false" | "0" | "no" | "bad" => Some(false),
        _ => None,
    }
}

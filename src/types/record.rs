//! Governance observation records

use crate::schema::{columns, ParsedRow};
use serde::{Deserialize, Serialize};

/// One governance observation for a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRecord {
    /// Tenant identifier (categorical, not unique)
    #[serde(alias = "Tenant")]
    pub tenant: String,

    /// Governance track (carried along, not used as a feature)
    #[serde(alias = "Track")]
    pub track: String,

    /// Age signal
    #[serde(alias = "Age")]
    pub age: f32,

    /// Security signal
    #[serde(alias = "Security")]
    pub security: f32,

    /// Activity signal
    #[serde(alias = "Activity")]
    pub activity: f32,

    /// Protection signal
    #[serde(alias = "Protection")]
    pub protection: f32,

    /// Usage signal
    #[serde(alias = "Usage")]
    pub usage: f32,

    /// Change signal
    #[serde(alias = "Change")]
    pub change: f32,

    /// Ground truth outcome (`true` = good). Optional for prediction input.
    #[serde(alias = "GoodBad", default)]
    pub label: Option<bool>,

    /// Free text, not used as a feature
    #[serde(alias = "Description", default)]
    pub description: String,
}

impl GovernanceRecord {
    /// Create an unlabeled record from the six signals, in feature order
    /// `age, security, activity, protection, usage, change`.
    pub fn with_signals(tenant: impl Into<String>, signals: [f32; 6]) -> Self {
        let [age, security, activity, protection, usage, change] = signals;
        Self {
            tenant: tenant.into(),
            track: String::new(),
            age,
            security,
            activity,
            protection,
            usage,
            change,
            label: None,
            description: String::new(),
        }
    }

    /// Attach a ground truth label
    pub fn labeled(mut self, label: bool) -> Self {
        self.label = Some(label);
        self
    }

    /// The six numeric signals in feature order
    pub fn signals(&self) -> [f32; 6] {
        [
            self.age,
            self.security,
            self.activity,
            self.protection,
            self.usage,
            self.change,
        ]
    }

    /// Numeric signal by column name
    pub fn signal(&self, name: &str) -> Option<f32> {
        match name {
            columns::AGE => Some(self.age),
            columns::SECURITY => Some(self.security),
            columns::ACTIVITY => Some(self.activity),
            columns::PROTECTION => Some(self.protection),
            columns::USAGE => Some(self.usage),
            columns::CHANGE => Some(self.change),
            _ => None,
        }
    }

    /// Text column by name
    pub fn text(&self, name: &str) -> Option<&str> {
        match name {
            columns::TENANT => Some(&self.tenant),
            columns::TRACK => Some(&self.track),
            columns::DESCRIPTION => Some(&self.description),
            _ => None,
        }
    }

    /// Build a record from a row parsed with the governance layout.
    ///
    /// Returns `None` when the row was parsed with a layout lacking one of
    /// the governance columns.
    pub fn from_row(row: &ParsedRow<'_>) -> Option<Self> {
        Some(Self {
            tenant: row.text(columns::TENANT)?.to_string(),
            track: row.text(columns::TRACK)?.to_string(),
            age: row.float(columns::AGE)?,
            security: row.float(columns::SECURITY)?,
            activity: row.float(columns::ACTIVITY)?,
            protection: row.float(columns::PROTECTION)?,
            usage: row.float(columns::USAGE)?,
            change: row.float(columns::CHANGE)?,
            label: row.boolean(columns::LABEL),
            description: row.text(columns::DESCRIPTION)?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataSchema;
    use csv::StringRecord;

    #[test]
    fn test_record_from_row() {
        let schema = DataSchema::governance();
        let fields = StringRecord::from(vec![
            "contoso", "Compliance", "1", "2", "3", "4", "5", "6", "bad", "stale sites",
        ]);
        let row = schema.parse_row(&fields).unwrap();
        let record = GovernanceRecord::from_row(&row).unwrap();

        assert_eq!(record.tenant, "contoso");
        assert_eq!(record.track, "Compliance");
        assert_eq!(record.signals(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(record.label, Some(false));
        assert_eq!(record.description, "stale sites");
    }

    #[test]
    fn test_record_serialization() {
        let record = GovernanceRecord::with_signals("fabrikam", [1.0; 6]).labeled(true);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: GovernanceRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}

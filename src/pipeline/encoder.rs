//! Fitted column transforms: one-hot encoding and min-max scaling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps a categorical column onto an indicator vector with one slot per
/// category seen during fitting. Unseen values encode to all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub input: String,
    pub output: String,
    slots: BTreeMap<String, usize>,
}

impl OneHotEncoder {
    /// Fit the encoder, assigning slots in order of first appearance.
    pub fn fit<'a, I>(input: &str, output: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut slots = BTreeMap::new();
        for value in values {
            let next = slots.len();
            slots.entry(value.to_string()).or_insert(next);
        }

        Self {
            input: input.to_string(),
            output: output.to_string(),
            slots,
        }
    }

    /// Number of slots in the encoded vector
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, value: &str) -> Option<usize> {
        self.slots.get(value).copied()
    }

    /// Categories ordered by slot
    pub fn categories(&self) -> Vec<&str> {
        let mut ordered: Vec<(&str, usize)> =
            self.slots.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        ordered.sort_by_key(|&(_, slot)| slot);
        ordered.into_iter().map(|(k, _)| k).collect()
    }

    /// Check that the slots are exactly `0..len`, each used once.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = vec![false; self.len()];
        for (category, &slot) in &self.slots {
            match seen.get_mut(slot) {
                Some(used) if !*used => *used = true,
                Some(_) => return Err(format!("slot {slot} of '{}' is assigned twice", self.input)),
                None => {
                    return Err(format!(
                        "category '{category}' of '{}' maps to slot {slot}, only {} slots exist",
                        self.input,
                        self.len()
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn encode(&self, value: &str) -> Vec<f32> {
        let mut encoded = vec![0.0; self.len()];
        if let Some(slot) = self.slot(value) {
            encoded[slot] = 1.0;
        }
        encoded
    }

    /// Append the indicator vector of `value` to `out`
    pub fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        let start = out.len();
        out.resize(start + self.len(), 0.0);
        if let Some(slot) = self.slot(value) {
            out[start + slot] = 1.0;
        }
    }
}

/// Per-feature scaling by `1 / max(|min|, |max|)`, keeping zero at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    scales: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on rows of equal width. Columns that are all zero keep scale 1.
    pub fn fit<'a, I>(rows: I, width: usize) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut max_abs = vec![0.0_f64; width];
        for row in rows {
            for (m, v) in max_abs.iter_mut().zip(row) {
                *m = m.max(v.abs());
            }
        }

        let scales = max_abs
            .into_iter()
            .map(|m| if m > 0.0 { 1.0 / m } else { 1.0 })
            .collect();

        Self { scales }
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Scale the leading features in place
    pub fn apply(&self, features: &mut [f64]) {
        for (v, s) in features.iter_mut().zip(&self.scales) {
            *v *= s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_first_appearance_order() {
        let encoder = OneHotEncoder::fit(
            "Tenant",
            "TenantOneHot",
            ["fabrikam", "contoso", "fabrikam", "northwind"],
        );

        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.categories(), vec!["fabrikam", "contoso", "northwind"]);
        assert_eq!(encoder.encode("contoso"), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_one_hot_unseen_value() {
        let encoder = OneHotEncoder::fit("Tenant", "TenantOneHot", ["a", "b"]);
        assert_eq!(encoder.encode("zzz"), vec![0.0, 0.0]);

        let mut out = vec![5.0];
        encoder.encode_into("b", &mut out);
        assert_eq!(out, vec![5.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_slot_out_of_range() {
        let mut encoder = OneHotEncoder::fit("Tenant", "TenantOneHot", ["a", "b"]);
        assert!(encoder.validate().is_ok());

        encoder.slots.insert("a".to_string(), 9);
        assert!(encoder.validate().unwrap_err().contains("slot 9"));
    }

    #[test]
    fn test_one_hot_duplicate_slot() {
        let mut encoder = OneHotEncoder::fit("Tenant", "TenantOneHot", ["a", "b"]);
        encoder.slots.insert("b".to_string(), 0);
        assert!(encoder.validate().is_err());
    }

    #[test]
    fn test_min_max_scaler() {
        let rows = vec![vec![2.0, -4.0, 0.0], vec![1.0, 2.0, 0.0]];
        let scaler = MinMaxScaler::fit(rows.iter().map(Vec::as_slice), 3);
        assert_eq!(scaler.scales(), &[0.5, 0.25, 1.0]);

        let mut features = vec![2.0, 2.0, 7.0];
        scaler.apply(&mut features);
        assert_eq!(features, vec![1.0, 0.5, 7.0]);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const SOURCE_FIELD_COLUMN: &str = "Source_Field";
pub const TARGET_RESOURCE_COLUMN: &str = "Target_FHIR_Resource";
pub const FHIR_ATTRIBUTE_COLUMN: &str = "FHIR_Attribute";

/// One line of a source-to-FHIR mapping table, keyed by header name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    /// 0-based position among data rows
    pub index: usize,
    pub values: BTreeMap<String, String>,
}

impl MappingRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn source_field(&self) -> Option<&str> {
        self.get(SOURCE_FIELD_COLUMN)
    }

    pub fn target_resource(&self) -> Option<&str> {
        self.get(TARGET_RESOURCE_COLUMN)
    }

    pub fn fhir_attribute(&self) -> Option<&str> {
        self.get(FHIR_ATTRIBUTE_COLUMN)
    }
}

/// Exact mapping cardinalities, used in place of estimated summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingStats {
    pub rows: usize,
    pub unique_attributes: usize,
}

impl MappingStats {
    /// Attributes are distinct `Resource.attribute` pairs; rows without an
    /// attribute fall back to their source field.
    pub fn from_rows(rows: &[MappingRow]) -> Self {
        let unique: HashSet<(Option<&str>, &str)> = rows
            .iter()
            .filter_map(|row| {
                row.fhir_attribute()
                    .or_else(|| row.source_field())
                    .map(|attribute| (row.target_resource(), attribute))
            })
            .collect();
        Self {
            rows: rows.len(),
            unique_attributes: unique.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, pairs: &[(&str, &str)]) -> MappingRow {
        MappingRow {
            index,
            values: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_stats_count_distinct_attributes() {
        let rows = vec![
            row(0, &[("Source_Field", "PID.3"), ("Target_FHIR_Resource", "Patient"), ("FHIR_Attribute", "identifier")]),
            row(1, &[("Source_Field", "PID.3.4"), ("Target_FHIR_Resource", "Patient"), ("FHIR_Attribute", "identifier")]),
            row(2, &[("Source_Field", "PID.8"), ("Target_FHIR_Resource", "Patient"), ("FHIR_Attribute", "gender")]),
            row(3, &[("Source_Field", "OBX.3"), ("Target_FHIR_Resource", "Observation"), ("FHIR_Attribute", "code")]),
        ];
        let stats = MappingStats::from_rows(&rows);
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.unique_attributes, 3);
    }

    #[test]
    fn test_blank_values_read_as_missing() {
        let row = row(0, &[("Source_Field", "MSH.3"), ("FHIR_Attribute", "")]);
        assert_eq!(row.fhir_attribute(), None);
        assert_eq!(row.source_field(), Some("MSH.3"));
        assert_eq!(MappingStats::from_rows(&[row]).unique_attributes, 1);
    }
}

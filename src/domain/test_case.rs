use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestCaseType {
    #[default]
    Functional,
    Regression,
    Edge,
}

impl TestCaseType {
    pub const ALL: [TestCaseType; 3] = [
        TestCaseType::Functional,
        TestCaseType::Regression,
        TestCaseType::Edge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TestCaseType::Functional => "FUNCTIONAL",
            TestCaseType::Regression => "REGRESSION",
            TestCaseType::Edge => "EDGE",
        }
    }

    /// Case-insensitive match against the known labels.
    pub fn parse_label(value: &str) -> Option<Self> {
        let label = value.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Subtype {
    #[default]
    Positive,
    Negative,
}

impl Subtype {
    pub const ALL: [Subtype; 2] = [Subtype::Positive, Subtype::Negative];

    pub fn as_str(self) -> &'static str {
        match self {
            Subtype::Positive => "POSITIVE",
            Subtype::Negative => "NEGATIVE",
        }
    }

    pub fn parse_label(value: &str) -> Option<Self> {
        let label = value.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|subtype| subtype.as_str() == label)
    }
}

/// One generated test case. Field names on the wire follow the prompt contract.
/// Keys beyond the known ones are kept in `extra` and written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    #[serde(rename = "TestCaseID", deserialize_with = "non_blank")]
    pub id: String,
    #[serde(rename = "TestDescription", deserialize_with = "non_blank")]
    pub description: String,
    #[serde(rename = "ExpectedOutput", deserialize_with = "non_blank")]
    pub expected_outcome: String,
    #[serde(rename = "TestSteps", deserialize_with = "non_empty_steps")]
    pub steps: Vec<String>,
    #[serde(rename = "PassFailCriteria", deserialize_with = "non_blank")]
    pub pass_fail_criteria: String,
    #[serde(rename = "TestCaseType")]
    pub category: TestCaseType,
    #[serde(rename = "Subtype")]
    pub subtype: Subtype,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Aggregate counts over a batch.
///
/// `mapping_rows` and `unique_attributes` are estimates unless the caller
/// replaced them with counts taken from the mapping itself. Keys a model
/// reports beyond the known ones are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticalSummary {
    #[serde(rename = "TotalTestCases", default)]
    pub total_test_cases: usize,
    #[serde(rename = "MappingRows", default)]
    pub mapping_rows: usize,
    #[serde(rename = "UniqueAttributes", default)]
    pub unique_attributes: usize,
    #[serde(rename = "TestCaseTypeBreakdown", default)]
    pub type_breakdown: BTreeMap<String, usize>,
    #[serde(rename = "SubtypeBreakdown", default)]
    pub subtype_breakdown: BTreeMap<String, usize>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The output document: `{"TestCases": [...], "StatisticalSummary": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseBatch {
    #[serde(rename = "TestCases")]
    pub test_cases: Vec<TestCaseRecord>,
    #[serde(rename = "StatisticalSummary")]
    pub statistical_summary: StatisticalSummary,
}

fn non_blank<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(de::Error::custom("expected a non-blank string"));
    }
    Ok(value)
}

fn non_empty_steps<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let steps = Vec::<String>::deserialize(deserializer)?;
    if steps.is_empty() || steps.iter().any(|step| step.trim().is_empty()) {
        return Err(de::Error::custom("expected non-blank test steps"));
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(category: &str, description: &str) -> String {
        format!(
            r#"{{"TestCaseID":"B_001_TC_001_functional_positive","TestDescription":"{}","ExpectedOutput":"e1","TestSteps":["s1","s2"],"PassFailCriteria":"p1","TestCaseType":"{}","Subtype":"POSITIVE"}}"#,
            description, category
        )
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let record: TestCaseRecord =
            serde_json::from_str(&record_json("REGRESSION", "d1")).unwrap();
        assert_eq!(record.id, "B_001_TC_001_functional_positive");
        assert_eq!(record.category, TestCaseType::Regression);
        assert_eq!(record.steps, vec!["s1", "s2"]);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["PassFailCriteria"], "p1");
        assert_eq!(value["Subtype"], "POSITIVE");
    }

    #[test]
    fn test_record_rejects_blank_fields() {
        assert!(serde_json::from_str::<TestCaseRecord>(&record_json("EDGE", "  ")).is_err());
    }

    #[test]
    fn test_record_rejects_unknown_category() {
        assert!(serde_json::from_str::<TestCaseRecord>(&record_json("SMOKE", "d1")).is_err());
    }

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!(TestCaseType::parse_label(" edge "), Some(TestCaseType::Edge));
        assert_eq!(TestCaseType::parse_label("smoke"), None);
        assert_eq!(Subtype::parse_label("Negative"), Some(Subtype::Negative));
        assert_eq!(Subtype::parse_label(""), None);
    }

    #[test]
    fn test_summary_keeps_unknown_keys() {
        let input = r#"{"TotalTestCases":2,"Coverage":"full","TestCaseTypeBreakdown":{"EDGE":2}}"#;
        let summary: StatisticalSummary = serde_json::from_str(input).unwrap();
        assert_eq!(summary.total_test_cases, 2);
        assert_eq!(summary.extra.get("Coverage").unwrap(), "full");

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["Coverage"], "full");
        assert_eq!(value["TestCaseTypeBreakdown"]["EDGE"], 2);
    }
}

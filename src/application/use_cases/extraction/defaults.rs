use crate::domain::test_case::{Subtype, TestCaseRecord, TestCaseType};

pub const DEFAULT_EXPECTED_OUTPUT: &str = "Expected system behavior validated";
pub const DEFAULT_PASS_FAIL_CRITERIA: &str = "Test passes when validation criteria are met";
pub const DEFAULT_TEST_STEPS: [&str; 3] = [
    "Execute test validation",
    "Verify expected behavior",
    "Confirm test results",
];

pub fn default_description(id: &str) -> String {
    format!("Validation test for {}", id)
}

/// Fields recovered from one record window. Each one is found (or not)
/// independently of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub description: Option<String>,
    pub expected_outcome: Option<String>,
    pub steps: Option<Vec<String>>,
    pub pass_fail_criteria: Option<String>,
    pub category: Option<TestCaseType>,
    pub subtype: Option<Subtype>,
}

impl PartialRecord {
    /// Fills every missing or blank field from the defaults table.
    pub fn complete(self, id: String) -> TestCaseRecord {
        let steps = self
            .steps
            .map(|steps| {
                steps
                    .into_iter()
                    .filter(|step| !step.trim().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|steps| !steps.is_empty())
            .unwrap_or_else(|| DEFAULT_TEST_STEPS.iter().map(|step| step.to_string()).collect());

        TestCaseRecord {
            description: non_blank(self.description).unwrap_or_else(|| default_description(&id)),
            expected_outcome: non_blank(self.expected_outcome)
                .unwrap_or_else(|| DEFAULT_EXPECTED_OUTPUT.to_string()),
            steps,
            pass_fail_criteria: non_blank(self.pass_fail_criteria)
                .unwrap_or_else(|| DEFAULT_PASS_FAIL_CRITERIA.to_string()),
            category: self.category.unwrap_or_default(),
            subtype: self.subtype.unwrap_or_default(),
            id,
            extra: serde_json::Map::new(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

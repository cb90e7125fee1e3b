use crate::application::use_cases::extraction::ExtractionPath;
use crate::domain::test_case::TestCaseBatch;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(custom(function = "not_blank"))]
    pub csv_mapping: String,
    /// Goes into test case ids and output file names.
    #[serde(default)]
    #[validate(custom(function = "batch_number_format"))]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(csv_mapping: impl Into<String>) -> Self {
        Self {
            csv_mapping: csv_mapping.into(),
            batch_number: None,
            user_id: None,
        }
    }

    pub fn with_batch_number(mut self, batch_number: impl Into<String>) -> Self {
        self.batch_number = Some(batch_number.into());
        self
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn batch_number_format(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ValidationError::new("batch_number_format"));
    }
    Ok(())
}

/// Metadata recorded for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRun {
    pub run_id: String,
    pub batch_number: String,
    pub user_id: String,
    pub model: String,
    pub prompt_version: String,
    /// SHA-256 of the system and user prompts
    pub prompt_digest: String,
    pub path: ExtractionPath,
    pub skipped: usize,
    pub mapping_rows: usize,
    pub started_at: String,
    pub duration_ms: i64,
    pub raw_chars: usize,
    pub cleaned_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub batch: TestCaseBatch,
    pub run: GenerationRun,
}

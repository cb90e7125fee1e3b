mod prompts;
#[cfg(test)]
mod tests;
mod types;

use crate::application::use_cases::extraction::statistics::apply_mapping_stats;
use crate::application::use_cases::extraction::{
    extract, prepare, Extraction, ExtractionConfig, ExtractionPath,
};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::mapping::MappingStats;
use crate::infrastructure::config::{AppSettings, GenerationSettings};
use crate::infrastructure::csv::MappingCsvParser;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::storage::save_debug_responses;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use prompts::{build_system_prompt, build_user_prompt, PROMPT_VERSION};
pub use types::{GenerationOutcome, GenerationRequest, GenerationRun};

pub struct TestCaseGenerationUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    llm_config: LLMConfig,
    extraction: ExtractionConfig,
    generation: GenerationSettings,
    parser: MappingCsvParser,
    debug_target: Option<PathBuf>,
}

impl TestCaseGenerationUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, settings: &AppSettings) -> Self {
        Self {
            llm_client,
            llm_config: settings.llm.clone(),
            extraction: settings.extraction.clone(),
            generation: settings.generation.clone(),
            parser: MappingCsvParser::new(),
            debug_target: None,
        }
    }

    /// Saves raw and cleaned responses next to `target` when a run yields
    /// too few test cases.
    pub fn with_debug_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.debug_target = Some(target.into());
        self
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let batch_number = request
            .batch_number
            .unwrap_or_else(|| self.generation.batch_number.clone());
        let user_id = request
            .user_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.generation.user_id.clone());

        let rows = self.parser.parse_content(&request.csv_mapping)?;
        if rows.is_empty() {
            return Err(AppError::ValidationError(
                "Mapping CSV has no data rows.".to_string(),
            ));
        }
        let mapping_stats = MappingStats::from_rows(&rows);

        let system_prompt = build_system_prompt();
        let user_prompt = build_user_prompt(&request.csv_mapping, &batch_number);
        let prompt_digest = digest_prompts(&system_prompt, &user_prompt);

        let run_id = Uuid::new_v4().to_string();
        let started = chrono::Utc::now();
        tracing::info!(
            run_id = %run_id,
            batch_number = %batch_number,
            user_id = %user_id,
            model = %self.llm_config.model,
            mapping_rows = mapping_stats.rows,
            "Generating test cases"
        );

        let raw = self
            .llm_client
            .generate(&self.llm_config, &system_prompt, &user_prompt)
            .await?;
        let cleaned = prepare(&raw);
        let mut extraction = extract(&cleaned, &self.extraction);

        if extraction.path == ExtractionPath::Recovered {
            apply_mapping_stats(&mut extraction.summary, mapping_stats);
        }

        let minimum = self.generation.min_test_cases.max(1);
        if extraction.len() < minimum {
            tracing::error!(
                run_id = %run_id,
                recovered = extraction.len(),
                minimum,
                "Model response did not yield enough test cases"
            );
            self.save_debug(&raw, &cleaned);
            return Err(AppError::InsufficientTestCases {
                recovered: extraction.len(),
                minimum,
            });
        }

        let duration_ms = (chrono::Utc::now() - started).num_milliseconds();
        tracing::info!(
            run_id = %run_id,
            test_cases = extraction.len(),
            path = ?extraction.path,
            skipped = extraction.skipped,
            duration_ms,
            "Test cases generated"
        );

        let run = GenerationRun {
            run_id,
            batch_number,
            user_id,
            model: self.llm_config.model.clone(),
            prompt_version: PROMPT_VERSION.to_string(),
            prompt_digest,
            path: extraction.path,
            skipped: extraction.skipped,
            mapping_rows: mapping_stats.rows,
            started_at: started.to_rfc3339(),
            duration_ms,
            raw_chars: raw.chars().count(),
            cleaned_chars: cleaned.chars().count(),
        };

        Ok(GenerationOutcome {
            batch: extraction.into_batch(),
            run,
        })
    }

    /// Runs the extraction pipeline over a previously saved response.
    pub fn extract_response(&self, raw: &str) -> Extraction {
        let extraction = extract(&prepare(raw), &self.extraction);
        tracing::info!(
            test_cases = extraction.len(),
            path = ?extraction.path,
            skipped = extraction.skipped,
            "Extracted saved response"
        );
        extraction
    }

    fn save_debug(&self, raw: &str, cleaned: &str) {
        let Some(target) = self.debug_target.as_ref() else {
            return;
        };
        match save_debug_responses(target, raw, cleaned) {
            Ok(files) => tracing::info!(
                raw = %files.raw.display(),
                cleaned = %files.cleaned.display(),
                "Saved unusable response for inspection"
            ),
            Err(err) => tracing::warn!(error = %err, "Failed to save debug responses"),
        }
    }
}

fn digest_prompts(system_prompt: &str, user_prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(system_prompt.as_bytes());
    hasher.update(b"\n");
    hasher.update(user_prompt.as_bytes());
    hex::encode(hasher.finalize())
}

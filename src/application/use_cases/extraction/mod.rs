//! Recovery of test-case batches from model output.
//!
//! The model is asked for a JSON document but may wrap it in fences, surround
//! it with prose or stop halfway through. [`normalize`] isolates the candidate
//! document and [`extract`] turns it into complete records, falling back to a
//! per-record scan whenever strict parsing is not good enough.

pub mod defaults;
mod extractor;
mod normalizer;
pub mod statistics;

use crate::domain::test_case::{StatisticalSummary, TestCaseBatch, TestCaseRecord};
use crate::infrastructure::response::{clean_llm_response, unwrap_completion_envelope};
use serde::{Deserialize, Serialize};

pub use extractor::{extract, extract_default, recover};
pub use normalizer::normalize;

/// Tunables for [`extract`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A strict parse is accepted only with more records than this.
    pub min_strict_records: usize,
    /// Bytes after a `TestCaseID` that are searched for that record's fields.
    pub window_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_strict_records: 5,
            window_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPath {
    /// The document parsed as a whole and was used as-is.
    Strict,
    /// Records were rebuilt one by one from field patterns.
    Recovered,
}

impl ExtractionPath {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionPath::Strict => "strict",
            ExtractionPath::Recovered => "recovered",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<TestCaseRecord>,
    pub summary: StatisticalSummary,
    pub path: ExtractionPath,
    /// `TestCaseID` occurrences dropped because their record could not be rebuilt
    pub skipped: usize,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_batch(self) -> TestCaseBatch {
        TestCaseBatch {
            test_cases: self.records,
            statistical_summary: self.summary,
        }
    }
}

/// Envelope unwrapping, reasoning-tag cleanup and normalization of a raw
/// model response.
pub fn prepare(raw: &str) -> String {
    normalize(&clean_llm_response(&unwrap_completion_envelope(raw)))
}

/// Full pipeline over a raw model response: [`prepare`] then [`extract`].
pub fn normalize_then_extract(raw: &str, config: &ExtractionConfig) -> Extraction {
    extract(&prepare(raw), config)
}

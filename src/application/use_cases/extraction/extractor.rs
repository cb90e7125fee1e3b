use super::defaults::PartialRecord;
use super::statistics::summarize;
use super::{Extraction, ExtractionConfig, ExtractionPath};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{Subtype, TestCaseBatch, TestCaseRecord, TestCaseType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Body of a JSON string literal; escaped quotes do not end it.
const STRING_BODY: &str = r#"((?:[^"\\]|\\.)*)"#;

static TEST_CASE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)"TestCaseID"\s*:\s*"((?:[^"\\]|\\.)+)""#).unwrap());

static DESCRIPTION_PATTERN: Lazy<Regex> = Lazy::new(|| string_field_pattern("TestDescription"));
static EXPECTED_OUTPUT_PATTERN: Lazy<Regex> = Lazy::new(|| string_field_pattern("ExpectedOutput"));
static PASS_FAIL_PATTERN: Lazy<Regex> = Lazy::new(|| string_field_pattern("PassFailCriteria"));
static TEST_CASE_TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| string_field_pattern("TestCaseType"));
static SUBTYPE_PATTERN: Lazy<Regex> = Lazy::new(|| string_field_pattern("Subtype"));

/// A `TestSteps` array holding only string literals. Anything else before the
/// closing bracket (a colon, a brace) means the block never closed.
static STEPS_BLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"TestSteps"\s*:\s*\[((?:\s*"(?:[^"\\]|\\.)*"\s*,?)*)\s*\]"#).unwrap()
});

static QUOTED_STRING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r#"(?s)"{}""#, STRING_BODY)).unwrap());

fn string_field_pattern(field: &str) -> Regex {
    Regex::new(&format!(
        r#"(?s)"{}"\s*:\s*"{}""#,
        regex::escape(field),
        STRING_BODY
    ))
    .unwrap()
}

/// Strict parse first, per-record recovery when that fails or yields no more
/// than `min_strict_records` test cases.
pub fn extract(text: &str, config: &ExtractionConfig) -> Extraction {
    match serde_json::from_str::<TestCaseBatch>(text) {
        Ok(batch) if batch.test_cases.len() > config.min_strict_records => {
            info!(
                test_cases = batch.test_cases.len(),
                "Strict JSON parse accepted"
            );
            return Extraction {
                records: batch.test_cases,
                summary: batch.statistical_summary,
                path: ExtractionPath::Strict,
                skipped: 0,
            };
        }
        Ok(batch) => info!(
            test_cases = batch.test_cases.len(),
            threshold = config.min_strict_records,
            "Strict JSON parse returned too few test cases, recovering per record"
        ),
        Err(err) => info!(error = %err, "Strict JSON parse failed, recovering per record"),
    }

    recover(text, config)
}

/// [`extract`] with the default threshold and window.
pub fn extract_default(text: &str) -> Extraction {
    extract(text, &ExtractionConfig::default())
}

/// Rebuilds records from every `TestCaseID` occurrence, ignoring whether the
/// document as a whole is valid. A later occurrence of an id replaces the
/// earlier record in place.
pub fn recover(text: &str, config: &ExtractionConfig) -> Extraction {
    let mut records: Vec<TestCaseRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for (occurrence, captures) in TEST_CASE_ID_PATTERN.captures_iter(text).enumerate() {
        let (Some(whole), Some(raw_id)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let window = bounded_window(text, whole.start(), config.window_size);

        match reconstruct_record(raw_id.as_str(), window) {
            Ok(record) => match positions.get(&record.id) {
                Some(&index) => {
                    debug!(test_case_id = %record.id, "Duplicate TestCaseID, keeping later occurrence");
                    records[index] = record;
                }
                None => {
                    debug!(test_case_id = %record.id, "Recovered test case");
                    positions.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            },
            Err(err) => {
                skipped += 1;
                warn!(
                    occurrence = occurrence + 1,
                    error = %err,
                    "Skipping test case that could not be reconstructed"
                );
            }
        }
    }

    info!(
        recovered = records.len(),
        skipped,
        "Per-record recovery finished"
    );

    let summary = summarize(&records);
    Extraction {
        records,
        summary,
        path: ExtractionPath::Recovered,
        skipped,
    }
}

/// `text[start..start + size]`, shortened to the nearest char boundary.
fn bounded_window(text: &str, start: usize, size: usize) -> &str {
    let mut end = start.saturating_add(size).min(text.len());
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

fn reconstruct_record(raw_id: &str, window: &str) -> Result<TestCaseRecord> {
    let id = decode_json_string(raw_id).ok_or_else(|| {
        AppError::ParseError(format!("TestCaseID {:?} is not a valid JSON string", raw_id))
    })?;
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::ValidationError("TestCaseID is blank".to_string()));
    }

    let partial = PartialRecord {
        description: capture_string(&DESCRIPTION_PATTERN, window),
        expected_outcome: capture_string(&EXPECTED_OUTPUT_PATTERN, window),
        steps: capture_steps(window),
        pass_fail_criteria: capture_string(&PASS_FAIL_PATTERN, window),
        category: capture_string(&TEST_CASE_TYPE_PATTERN, window)
            .and_then(|label| TestCaseType::parse_label(&label)),
        subtype: capture_string(&SUBTYPE_PATTERN, window)
            .and_then(|label| Subtype::parse_label(&label)),
    };

    Ok(partial.complete(id.to_string()))
}

fn capture_string(pattern: &Regex, window: &str) -> Option<String> {
    let body = pattern.captures(window)?.get(1)?.as_str();
    Some(decode_json_string(body).unwrap_or_else(|| body.to_string()))
}

fn capture_steps(window: &str) -> Option<Vec<String>> {
    let block = STEPS_BLOCK_PATTERN.captures(window)?.get(1)?.as_str();
    let steps = QUOTED_STRING_PATTERN
        .captures_iter(block)
        .filter_map(|captures| captures.get(1))
        .map(|body| {
            let body = body.as_str();
            decode_json_string(body).unwrap_or_else(|| body.to_string())
        })
        .collect();
    Some(steps)
}

/// Decodes the inside of a JSON string literal (`\"`, `\n`, `\u00e9` ...).
fn decode_json_string(body: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{}\"", body)).ok()
}

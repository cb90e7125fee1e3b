use super::*;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use std::sync::Mutex;

const MAPPING: &str = "Source_Field,Target_FHIR_Resource,FHIR_Attribute,Data_Type\n\
PID.3,Patient,identifier,Identifier\n\
PID.5,Patient,name,HumanName\n\
PID.7,Patient,birthDate,date\n\
PID.8,Patient,gender,code\n";

struct StubClient {
    response: std::result::Result<String, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl StubClient {
    fn replying(response: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LLMClient for StubClient {
    async fn generate(&self, _config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.response.clone().map_err(AppError::LLMError)
    }
}

fn record(n: usize, category: &str, subtype: &str) -> String {
    format!(
        r#"{{"TestCaseID":"B_001_TC_{n:03}","TestDescription":"d{n}","ExpectedOutput":"e{n}","TestSteps":["s1"],"PassFailCriteria":"p{n}","TestCaseType":"{category}","Subtype":"{subtype}"}}"#
    )
}

fn document(records: &[String]) -> String {
    format!(
        r#"{{"TestCases":[{}],"StatisticalSummary":{{"TotalTestCases":{},"MappingRows":99,"UniqueAttributes":99}}}}"#,
        records.join(","),
        records.len()
    )
}

fn use_case(client: Arc<StubClient>) -> TestCaseGenerationUseCase {
    TestCaseGenerationUseCase::new(client, &AppSettings::default())
}

#[tokio::test]
async fn test_strict_response_keeps_reported_summary() {
    let records: Vec<String> = (1..=6).map(|n| record(n, "FUNCTIONAL", "POSITIVE")).collect();
    let client = StubClient::replying(format!("```json\n{}\n```", document(&records)));

    let outcome = use_case(client.clone())
        .generate(GenerationRequest::new(MAPPING))
        .await
        .unwrap();

    assert_eq!(outcome.run.path, ExtractionPath::Strict);
    assert_eq!(outcome.batch.test_cases.len(), 6);
    assert_eq!(outcome.batch.statistical_summary.mapping_rows, 99);
    assert_eq!(outcome.run.batch_number, "001");
    assert_eq!(outcome.run.user_id, "external_client");
    assert_eq!(outcome.run.prompt_digest.len(), 64);
    assert_eq!(outcome.run.mapping_rows, 4);

    let prompts = client.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].1.contains("PID.8,Patient,gender,code"));
}

#[tokio::test]
async fn test_recovered_response_uses_exact_mapping_counts() {
    let mut text = String::from(r#"{"TestCases":["#);
    for n in 1..=7 {
        text.push_str(&record(n, "EDGE", "NEGATIVE"));
        text.push(',');
    }
    // Eighth record is closed but the array never is, so the strict parse fails.
    text.push_str(r#"{"TestCaseID":"B_001_TC_008","TestDescription":"cut"}"#);
    let client = StubClient::replying(text);

    let outcome = use_case(client)
        .generate(GenerationRequest::new(MAPPING).with_batch_number("002"))
        .await
        .unwrap();

    let summary = &outcome.batch.statistical_summary;
    assert_eq!(outcome.run.path, ExtractionPath::Recovered);
    assert_eq!(outcome.run.batch_number, "002");
    assert_eq!(summary.total_test_cases, 8);
    assert_eq!(summary.mapping_rows, 4);
    assert_eq!(summary.unique_attributes, 4);
    assert_eq!(summary.type_breakdown["EDGE"], 7);
    assert_eq!(summary.type_breakdown["FUNCTIONAL"], 1);
}

#[tokio::test]
async fn test_too_few_records_is_insufficient_and_saves_debug_files() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("B_001_test_cases.json");
    let records: Vec<String> = (1..=3).map(|n| record(n, "REGRESSION", "POSITIVE")).collect();
    let client = StubClient::replying(document(&records));

    let err = use_case(client)
        .with_debug_target(&target)
        .generate(GenerationRequest::new(MAPPING))
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientTestCases { recovered, minimum } => {
            assert_eq!(recovered, 3);
            assert_eq!(minimum, 6);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(dir.path().join("B_001_test_cases_raw.txt").exists());
    assert!(dir.path().join("B_001_test_cases_cleaned.txt").exists());
}

#[tokio::test]
async fn test_empty_response_is_insufficient() {
    let err = use_case(StubClient::replying(""))
        .generate(GenerationRequest::new(MAPPING))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientTestCases {
            recovered: 0,
            minimum: 6
        }
    ));
}

#[tokio::test]
async fn test_zero_cutoff_still_rejects_empty_result() {
    let mut settings = AppSettings::default();
    settings.generation.min_test_cases = 0;
    let use_case = TestCaseGenerationUseCase::new(StubClient::replying("no json"), &settings);

    let err = use_case
        .generate(GenerationRequest::new(MAPPING))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientTestCases { recovered: 0, minimum: 1 }
    ));
}

#[tokio::test]
async fn test_invalid_requests_never_reach_the_model() {
    let client = StubClient::replying("{}");
    let use_case = use_case(client.clone());

    let blank = use_case.generate(GenerationRequest::new("   ")).await;
    assert!(matches!(blank, Err(AppError::ValidationError(_))));

    let header_only = use_case
        .generate(GenerationRequest::new("Source_Field,FHIR_Attribute\n"))
        .await;
    assert!(matches!(header_only, Err(AppError::ValidationError(_))));

    assert!(client.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_llm_failure_is_propagated() {
    let err = use_case(StubClient::failing("API error (503)"))
        .generate(GenerationRequest::new(MAPPING))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LLMError(message) if message.contains("503")));
}

#[test]
fn test_extract_response_has_no_cutoff() {
    let use_case = use_case(StubClient::replying(""));
    let extraction = use_case.extract_response(&document(&[record(1, "EDGE", "POSITIVE")]));

    assert_eq!(extraction.len(), 1);
    assert_eq!(extraction.path, ExtractionPath::Recovered);
    assert_eq!(extraction.summary.mapping_rows, 0);
}

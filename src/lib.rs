mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use app::run;
pub use application::use_cases::extraction::{
    extract, extract_default, normalize, normalize_then_extract, Extraction, ExtractionConfig,
    ExtractionPath,
};
pub use domain::error::{AppError, Result};
pub use domain::test_case::{StatisticalSummary, TestCaseBatch, TestCaseRecord};

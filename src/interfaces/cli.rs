use crate::application::use_cases::extraction::Extraction;
use crate::application::use_cases::test_case_generation::{
    GenerationRequest, TestCaseGenerationUseCase,
};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{StatisticalSummary, TestCaseBatch};
use crate::infrastructure::config::AppSettings;
use crate::infrastructure::csv::{read_mapping_text, MappingCsvParser};
use crate::infrastructure::llm_clients::RouterClient;
use crate::infrastructure::storage::save_batch;
use crate::interfaces::http::start_server;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Generate FHIR mapping test cases and recover them from model output
#[derive(Parser, Debug)]
#[command(name = "fhir-testgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Extract test cases from a saved model response
    Extract {
        /// File holding the raw response text
        response: PathBuf,

        /// Write the batch here instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate test cases for a mapping CSV
    Generate {
        /// Mapping table (`Source_Field,Target_FHIR_Resource,FHIR_Attribute,...`)
        mapping: PathBuf,

        /// Batch number used in test case ids and the default output name
        #[arg(long)]
        batch: Option<String>,

        /// Output file (default: `<output.dir>/B_<batch>_test_cases.json`)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

pub async fn execute(command: Command, settings: AppSettings) -> Result<()> {
    match command {
        Command::Extract { response, out } => {
            let use_case = build_use_case(&settings);
            let raw = std::fs::read_to_string(&response).map_err(|e| {
                AppError::IoError(format!("Failed to read {}: {}", response.display(), e))
            })?;
            let extraction = use_case.extract_response(&raw);
            if extraction.is_empty() {
                return Err(AppError::InsufficientTestCases {
                    recovered: 0,
                    minimum: 1,
                });
            }
            print_extraction(&extraction);
            let batch = extraction.into_batch();
            match out {
                Some(out) => write_batch(&out, &batch),
                None => {
                    println!("{}", serde_json::to_string_pretty(&batch)?);
                    Ok(())
                }
            }
        }
        Command::Generate {
            mapping,
            batch,
            out,
        } => {
            let rows = MappingCsvParser::new().parse_file(&mapping)?;
            if rows.is_empty() {
                return Err(AppError::ValidationError(format!(
                    "{} has no mapping rows",
                    mapping.display()
                )));
            }
            tracing::info!(mapping = %mapping.display(), rows = rows.len(), "Loaded mapping");
            let csv_mapping = read_mapping_text(&mapping)?;
            let batch_number = batch.unwrap_or_else(|| settings.generation.batch_number.clone());
            let out = out.unwrap_or_else(|| settings.output.batch_file(&batch_number));

            let use_case = build_use_case(&settings).with_debug_target(&out);
            let outcome = use_case
                .generate(GenerationRequest::new(csv_mapping).with_batch_number(batch_number))
                .await?;

            println!(
                "Run {} ({}, {} path, {} ms)",
                outcome.run.run_id,
                outcome.run.model,
                outcome.run.path.as_str(),
                outcome.run.duration_ms
            );
            print_summary(&outcome.batch.statistical_summary);
            write_batch(&out, &outcome.batch)
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.http.host.clone());
            let port = port.unwrap_or(settings.http.port);
            let use_case = Arc::new(build_use_case(&settings));
            start_server(use_case, &host, port)?.await?;
            Ok(())
        }
    }
}

/// Exit status for a failed command: 2 for an unusable model response.
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::InsufficientTestCases { .. } => 2,
        _ => 1,
    }
}

fn build_use_case(settings: &AppSettings) -> TestCaseGenerationUseCase {
    TestCaseGenerationUseCase::new(Arc::new(RouterClient::new()), settings)
}

fn write_batch(out: &Path, batch: &TestCaseBatch) -> Result<()> {
    save_batch(out, batch)?;
    println!("Saved {}", out.display());
    Ok(())
}

fn print_extraction(extraction: &Extraction) {
    println!(
        "Extracted {} test cases ({} skipped)",
        extraction.len(),
        extraction.skipped
    );
    print_summary(&extraction.summary);
}

fn print_summary(summary: &StatisticalSummary) {
    println!("Total test cases: {}", summary.total_test_cases);
    println!("Mapping rows: {}", summary.mapping_rows);
    println!("Unique attributes: {}", summary.unique_attributes);
    for (label, count) in &summary.type_breakdown {
        println!("  {}: {}", label, count);
    }
    for (label, count) in &summary.subtype_breakdown {
        println!("  {}: {}", label, count);
    }
}

use crate::application::use_cases::extraction::ExtractionConfig;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "FHIR_TESTGEN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "fhir-testgen.toml";
const ENV_PREFIX: &str = "FHIR_TESTGEN_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// A generation run fails with fewer usable test cases than this.
    pub min_test_cases: usize,
    pub batch_number: String,
    pub user_id: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_test_cases: 6,
            batch_number: "001".to_string(),
            user_id: "external_client".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl OutputSettings {
    pub fn batch_file(&self, batch_number: &str) -> PathBuf {
        self.dir.join(format!("B_{}_test_cases.json", batch_number))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub llm: LLMConfig,
    pub extraction: ExtractionConfig,
    pub generation: GenerationSettings,
    pub http: HttpSettings,
    pub output: OutputSettings,
}

impl AppSettings {
    /// Defaults, then the TOML file, then `FHIR_TESTGEN_*` variables
    /// (`FHIR_TESTGEN_LLM__MODEL` sets `llm.model`).
    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Figment::from(Serialized::defaults(AppSettings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
    }

    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!(error = %err, "Failed to read .env file"),
        }

        let mut settings: AppSettings = Self::figment().extract()?;
        settings.resolve_api_key();
        Ok(settings)
    }

    /// Falls back to the provider's conventional key variable.
    fn resolve_api_key(&mut self) {
        let configured = self
            .llm
            .api_key
            .as_ref()
            .is_some_and(|key| !key.trim().is_empty());
        if !configured {
            self.llm.api_key = std::env::var(self.llm.api_key_env_var())
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LLMProvider {
    #[serde(alias = "gemini", alias = "google")]
    Gemini,
    /// Any OpenAI-compatible `chat/completions` endpoint (OpenRouter, local servers).
    #[serde(alias = "openrouter", alias = "openai")]
    OpenRouter,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            max_tokens: Some(8192),
            temperature: Some(0.2),
        }
    }
}

impl LLMConfig {
    /// Environment variable consulted when no key is configured explicitly.
    pub fn api_key_env_var(&self) -> &'static str {
        match self.provider {
            LLMProvider::Gemini => "GEMINI_API_KEY",
            LLMProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

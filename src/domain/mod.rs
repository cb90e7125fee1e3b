pub mod error;
pub mod llm_config;
pub mod mapping;
pub mod test_case;

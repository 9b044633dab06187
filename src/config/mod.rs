pub mod cli;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wsdl2soapui")]
#[command(about = "Generate a SoapUI test project from a WSDL using an LLM")]
pub struct CliConfig {
    /// Path to the WSDL file to introspect
    pub wsdl_file: String,

    /// Free-text requirements passed verbatim into the generation prompt
    #[arg(long, default_value = "")]
    pub requirements: String,

    #[arg(long, default_value = "http://localhost:11434")]
    pub ollama_url: String,

    #[arg(long, default_value = "mistral")]
    pub model: String,

    /// Per-operation generation timeout in seconds
    #[arg(long, default_value = "120")]
    pub timeout_secs: u64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn ollama_base_url(&self) -> &str {
        &self.ollama_url
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("wsdl_file", &self.wsdl_file)?;
        validate_url("ollama_url", &self.ollama_url)?;
        validate_non_empty_string("model", &self.model)?;
        validate_positive_number("timeout_secs", self.timeout_secs, 1)?;
        validate_non_empty_string("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            wsdl_file: "service.wsdl".to_string(),
            requirements: String::new(),
            ollama_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout_secs: 120,
            output_path: "./output".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_ollama_url_rejected() {
        let mut config = base_config();
        config.ollama_url = "ftp://somewhere".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = base_config();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{AppError, ConfigError};

/// Program configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// Maximum number of generated tokens
    pub token_length: u32,
    pub temperature: f32,
    /// Tensor format tag of the serving runtime, kept for parity, never sent
    pub return_tensor_format: String,
    /// Overrides the built-in Ganga prompt when set
    pub prompt: Option<String>,
    /// Side file holding the raw generation output
    pub llm_output_file: PathBuf,
    /// Directory the extracted snippets are written to
    pub output_dir: PathBuf,

    // --- initial task ---
    /// Directory holding the input PDF and receiving results
    pub data_dir: PathBuf,
    pub pdf_file: String,
    pub target_word: String,
    pub wrapper_script: PathBuf,

    // --- jobs ---
    pub jobs_dir: PathBuf,
    pub poll_timeout_secs: u64,
    pub poll_interval_secs: u64,

    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "http://localhost:8000/v1".to_string(),
            llm_model_name: "deepseek-ai/deepseek-coder-1.3b-instruct".to_string(),
            token_length: 1024,
            temperature: 0.3,
            return_tensor_format: "pt".to_string(),
            prompt: None,
            llm_output_file: PathBuf::from("llm_output.txt"),
            output_dir: PathBuf::from("."),
            data_dir: PathBuf::from("."),
            pdf_file: "LHC.pdf".to_string(),
            target_word: "it".to_string(),
            wrapper_script: PathBuf::from("run_initial_task.sh"),
            jobs_dir: PathBuf::from("gangadir/jobs"),
            poll_timeout_secs: 60,
            poll_interval_secs: 1,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Reads a TOML file (missing keys take defaults), then applies env overrides
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path, e))
            .with_context(|| format!("cannot read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::from(ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;

        config.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self> {
        Ok(Self {
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            token_length: env_parsed("LLM_TOKEN_LENGTH", "u32")?.unwrap_or(self.token_length),
            temperature: env_parsed("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            return_tensor_format: self.return_tensor_format,
            prompt: env_string("LLM_PROMPT").or(self.prompt),
            llm_output_file: env_string("LLM_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(self.llm_output_file),
            output_dir: env_string("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.output_dir),
            data_dir: env_string("DATA_DIR").map(PathBuf::from).unwrap_or(self.data_dir),
            pdf_file: env_string("PDF_FILE").unwrap_or(self.pdf_file),
            target_word: env_string("TARGET_WORD").unwrap_or(self.target_word),
            wrapper_script: self.wrapper_script,
            jobs_dir: env_string("JOBS_DIR").map(PathBuf::from).unwrap_or(self.jobs_dir),
            poll_timeout_secs: env_parsed("POLL_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.poll_timeout_secs),
            poll_interval_secs: env_parsed("POLL_INTERVAL_SECS", "u64")?
                .unwrap_or(self.poll_interval_secs),
            verbose_logging: env_parsed("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok()
}

fn env_parsed<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.parse::<T>().map(Some).map_err(|_| {
            AppError::from(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_task() {
        let config = Config::default();
        assert_eq!(config.pdf_file, "LHC.pdf");
        assert_eq!(config.target_word, "it");
        assert_eq!(config.poll_timeout(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.token_length, 1024);
    }

    #[test]
    fn test_toml_partial_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genai.toml");
        std::fs::write(
            &path,
            "pdf_file = \"atlas.pdf\"\npoll_timeout_secs = 5\nprompt = \"write pi code\"\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.pdf_file, "atlas.pdf");
        assert_eq!(config.poll_timeout_secs, 5);
        assert_eq!(config.prompt.as_deref(), Some("write pi code"));
        assert_eq!(config.wrapper_script, PathBuf::from("run_initial_task.sh"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "poll_timeout_secs = \"soon\"\n").unwrap();

        let err = Config::from_toml_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(ConfigError::TomlParseFailed { .. }))
        ));
    }
}

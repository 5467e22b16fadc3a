//! Analyzer Configuration
//!
//! Layered settings: built-in defaults, then an optional TOML file, then
//! environment variables (the process environment first, then `.env`). CLI
//! flags are applied last by the commands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use perf_analyzer_core::ProxyConfig;
use perf_analyzer_llm::{ProviderConfig, ProviderType, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::models::SchemaValidation;
use crate::services::report::{AnalysisOptions, DigestOptions};
use crate::utils::error::{AppError, AppResult};

pub const ENV_PROVIDER: &str = "PERF_ANALYZER_PROVIDER";
pub const ENV_BASE_URL: &str = "PERF_ANALYZER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PERF_ANALYZER_TIMEOUT_SECS";
pub const ENV_PROXY: &str = "PERF_ANALYZER_PROXY";
pub const ENV_MAX_LOG_LINES: &str = "PERF_ANALYZER_MAX_LOG_LINES";

/// Dotenv file read from the working directory
pub const DOTENV_FILE: &str = ".env";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub digest: DigestSettings,
    #[serde(default)]
    pub schema_validation: SchemaValidation,
    #[serde(default)]
    pub paths: PathSettings,
}

/// Model service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,
    /// Never written back out with the config
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Proxy URL, e.g. `http://proxy.local:3128`
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_provider() -> ProviderType {
    ProviderType::Gemini
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            proxy: None,
        }
    }
}

impl LlmSettings {
    /// Environment variables holding the key and model for the provider
    pub fn credential_env(&self) -> (&'static str, &'static str) {
        match self.provider {
            ProviderType::Gemini => ("GEMINI_API_KEY", "GEMINI_MODEL_ID"),
            ProviderType::OpenAI => ("OPENAI_API_KEY", "OPENAI_MODEL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSettings {
    /// Cap on retained WARN/ERROR lines; 0 disables the cap
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

fn default_max_lines() -> usize {
    100
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
        }
    }
}

/// Default input/output locations for the batch command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_inputs_dir")]
    pub inputs_dir: PathBuf,
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,
    #[serde(default = "default_context_file")]
    pub context_file: PathBuf,
}

fn default_inputs_dir() -> PathBuf {
    PathBuf::from("inputs")
}

fn default_outputs_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_context_file() -> PathBuf {
    PathBuf::from("data").join("performance_test_scenarios.csv")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            inputs_dir: default_inputs_dir(),
            outputs_dir: default_outputs_dir(),
            context_file: default_context_file(),
        }
    }
}

impl PathSettings {
    pub fn summary_file(&self) -> PathBuf {
        self.inputs_dir.join("statistics.json")
    }

    pub fn test_config_file(&self) -> PathBuf {
        self.inputs_dir.join("test_config.json")
    }

    pub fn output_file(&self) -> PathBuf {
        self.outputs_dir.join("analysis_recommendations.json")
    }
}

impl AnalyzerConfig {
    /// Defaults, then `file` if given, then the environment and `./.env`.
    ///
    /// Does not validate; call `validate()` or go through
    /// `ReportParser::from_config`.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        Self::load_with_dotenv(file, Path::new(DOTENV_FILE))
    }

    /// Like `load`, reading dotenv values from `dotenv`. A missing dotenv
    /// file is skipped; process variables win over dotenv entries.
    pub fn load_with_dotenv(file: Option<&Path>, dotenv: &Path) -> AppResult<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let dotenv_vars = read_dotenv(dotenv)?;
        config.apply_env_with(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv_vars.get(key).cloned())
        })?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|e| AppError::config(format!("{} ({})", e, path.display())))
    }

    pub fn from_toml_str(raw: &str) -> AppResult<Self> {
        toml::from_str(raw).map_err(|e| AppError::config(format!("Invalid config: {}", e)))
    }

    /// Overlay values from `lookup`. Blank values count as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get(ENV_PROVIDER) {
            self.llm.provider = provider.parse().map_err(AppError::Config)?;
        }

        let (key_var, model_var) = self.llm.credential_env();
        if let Some(api_key) = get(key_var) {
            self.llm.api_key = Some(api_key);
        }
        if let Some(model) = get(model_var) {
            self.llm.model = Some(model);
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.llm.base_url = Some(base_url);
        }
        if let Some(timeout) = get(ENV_TIMEOUT_SECS) {
            self.llm.timeout_secs = timeout.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))
            })?;
        }
        if let Some(proxy) = get(ENV_PROXY) {
            self.llm.proxy = Some(proxy);
        }
        if let Some(max_lines) = get(ENV_MAX_LOG_LINES) {
            self.digest.max_lines = max_lines.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be a non-negative integer", ENV_MAX_LOG_LINES))
            })?;
        }
        Ok(())
    }

    /// Check that the model call can be made.
    pub fn validate(&self) -> AppResult<()> {
        let (key_var, model_var) = self.llm.credential_env();

        if is_blank(self.llm.api_key.as_deref()) {
            return Err(AppError::config(format!(
                "No API key configured for {} (set {} or llm.api_key)",
                self.llm.provider, key_var
            )));
        }
        if is_blank(self.llm.model.as_deref()) {
            return Err(AppError::config(format!(
                "No model configured for {} (set {} or llm.model)",
                self.llm.provider, model_var
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AppError::config("llm.timeout_secs must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(AppError::config(
                "retry.base_delay_ms cannot exceed retry.max_delay_ms",
            ));
        }
        if let Some(proxy) = &self.llm.proxy {
            ProxyConfig::parse(proxy)?;
        }
        Ok(())
    }

    /// Validated provider settings for `create_provider`
    pub fn provider_config(&self) -> AppResult<ProviderConfig> {
        self.validate()?;
        let proxy = self
            .llm
            .proxy
            .as_deref()
            .map(ProxyConfig::parse)
            .transpose()?;

        Ok(ProviderConfig {
            provider: self.llm.provider,
            api_key: self.llm.api_key.clone(),
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone().unwrap_or_default(),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            timeout_secs: self.llm.timeout_secs,
            proxy,
        })
    }

    /// Pipeline options derived from this config
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            digest: DigestOptions::capped(self.digest.max_lines),
            retry: self.retry.clone(),
            schema_validation: self.schema_validation,
        }
    }
}

fn read_dotenv(path: &Path) -> AppResult<HashMap<String, String>> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let entries = dotenvy::from_path_iter(path).map_err(|e| {
        AppError::config(format!("Cannot read dotenv file {}: {}", path.display(), e))
    })?;
    entries
        .map(|entry| {
            entry.map_err(|e| {
                AppError::config(format!("Invalid dotenv file {}: {}", path.display(), e))
            })
        })
        .collect()
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).unwrap_or("").is_empty()
}

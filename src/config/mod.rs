//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `TRIAGE_*` environment variables. The service
//! base URL has no default: commands that call the embedding or completion API fail at
//! startup without it.

pub mod error;


pub use error::{ConfigError, ConfigResult};

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBED_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::embedding::EmbeddingConfig;
use crate::scoring::ChatConfig;
use crate::storage::ArtifactPaths;

/// Resolver configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TRIAGE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the built artifacts. Default: `./data`.
    pub data_dir: PathBuf,

    /// Knowledge-base dataset read by the index builder. Default: `./data/smart_support.xlsx`.
    pub dataset_path: PathBuf,

    /// Base URL of the OpenAI-compatible API (embeddings + chat completions).
    pub api_base: Option<String>,

    /// Bearer token for the API.
    pub api_key: Option<String>,

    /// Default: `bge-m3`.
    pub embedding_model: String,

    pub llm_model: String,

    /// Per-request timeout for both services. Default: `30000`.
    pub request_timeout_ms: u64,

    /// Questions per embedding request during builds. Default: `32`.
    pub embed_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            dataset_path: PathBuf::from("./data/smart_support.xlsx"),
            api_base: None,
            api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }
}

impl Config {
    pub const ENV_DATA_DIR: &'static str = "TRIAGE_DATA_DIR";
    pub const ENV_DATASET_PATH: &'static str = "TRIAGE_DATASET_PATH";
    pub const ENV_API_BASE: &'static str = "TRIAGE_API_BASE";
    pub const ENV_API_KEY: &'static str = "TRIAGE_API_KEY";
    pub const ENV_EMBEDDING_MODEL: &'static str = "TRIAGE_EMBEDDING_MODEL";
    pub const ENV_LLM_MODEL: &'static str = "TRIAGE_LLM_MODEL";
    pub const ENV_REQUEST_TIMEOUT_MS: &'static str = "TRIAGE_REQUEST_TIMEOUT_MS";
    pub const ENV_EMBED_BATCH_SIZE: &'static str = "TRIAGE_EMBED_BATCH_SIZE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            data_dir: Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir),
            dataset_path: Self::parse_path_from_env(Self::ENV_DATASET_PATH, defaults.dataset_path),
            api_base: Self::parse_optional_string_from_env(Self::ENV_API_BASE),
            api_key: Self::parse_optional_string_from_env(Self::ENV_API_KEY),
            embedding_model: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_MODEL)
                .unwrap_or(defaults.embedding_model),
            llm_model: Self::parse_optional_string_from_env(Self::ENV_LLM_MODEL)
                .unwrap_or(defaults.llm_model),
            request_timeout_ms: Self::parse_u64_from_env(
                Self::ENV_REQUEST_TIMEOUT_MS,
                defaults.request_timeout_ms,
            )?,
            embed_batch_size: Self::parse_u64_from_env(
                Self::ENV_EMBED_BATCH_SIZE,
                defaults.embed_batch_size as u64,
            )? as usize,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        if self.dataset_path.exists() && !self.dataset_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.dataset_path.clone(),
            });
        }

        if let Some(ref base) = self.api_base
            && !(base.starts_with("http://") || base.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl {
                name: Self::ENV_API_BASE,
                value: base.clone(),
            });
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT_MS,
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.embed_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBED_BATCH_SIZE,
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus a dataset check for builds that will read it.
    ///
    /// Without `recreate` a build over a complete artifact set never opens the dataset, so a
    /// missing dataset is only an error when some artifact is missing.
    pub fn validate_for_build(&self, recreate: bool) -> Result<(), ConfigError> {
        self.validate()?;
        if (recreate || !self.artifact_paths().all_exist()) && !self.dataset_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.dataset_path.clone(),
            });
        }
        Ok(())
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.data_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The API base URL, required by every command that calls the service.
    pub fn require_api_base(&self) -> Result<&str, ConfigError> {
        self.api_base
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_API_BASE,
            })
    }

    pub fn embedding_config(&self) -> Result<EmbeddingConfig, ConfigError> {
        Ok(EmbeddingConfig::new(self.require_api_base()?)
            .with_api_key(self.api_key.clone())
            .with_model(self.embedding_model.clone())
            .with_timeout(self.request_timeout()))
    }

    pub fn chat_config(&self) -> Result<ChatConfig, ConfigError> {
        Ok(ChatConfig::new(self.require_api_base()?)
            .with_api_key(self.api_key.clone())
            .with_model(self.llm_model.clone())
            .with_timeout(self.request_timeout()))
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|source| ConfigError::NumberParseError {
                        name: var_name,
                        value,
                        source,
                    })
            }
            _ => Ok(default),
        }
    }
}

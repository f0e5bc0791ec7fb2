use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use strum::{Display, EnumString};

use crate::domain::hazards::{embedder, RetrievalConfig};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    /// Origin allowed by CORS; any origin when unset
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

/// Embedding provider settings. Without an API key the semantic strategy is disabled.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: embedder::OPENAI_MODEL.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            dimensions: embedder::OPENAI_DIMENSIONS,
        }
    }
}

impl EmbeddingSettings {
    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Retrieval tuning. Every field is optional and falls back to the engine defaults.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RetrievalSettings {
    pub semantic_limit: i64,
    pub similarity_threshold: f64,
    pub context_limit: i64,
    pub critical_limit: i64,
    pub critical_min_confidence: f64,
    pub critical_primary_category_qualifies: bool,
    pub max_results: usize,
    pub max_description_length: usize,
    pub embedding_timeout_ms: u64,
    pub query_timeout_ms: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        let defaults = RetrievalConfig::default();
        Self {
            semantic_limit: defaults.semantic_limit,
            similarity_threshold: defaults.similarity_threshold,
            context_limit: defaults.context_limit,
            critical_limit: defaults.critical_limit,
            critical_min_confidence: defaults.critical_min_confidence,
            critical_primary_category_qualifies: defaults.critical_primary_category_qualifies,
            max_results: defaults.max_results,
            max_description_length: defaults.max_description_length,
            embedding_timeout_ms: defaults.embedding_timeout.as_millis() as u64,
            query_timeout_ms: defaults.query_timeout.as_millis() as u64,
        }
    }
}

/// Store limits are bound as `int4`, so they must be positive and fit in an `i32`.
fn query_limit(name: &str, value: i64) -> Result<i64, config::ConfigError> {
    if value > 0 && i32::try_from(value).is_ok() {
        Ok(value)
    } else {
        Err(config::ConfigError::Message(format!(
            "retrieval.{name} must be between 1 and {}, got {value}",
            i32::MAX
        )))
    }
}

impl TryFrom<RetrievalSettings> for RetrievalConfig {
    type Error = config::ConfigError;

    fn try_from(settings: RetrievalSettings) -> Result<Self, Self::Error> {
        if settings.max_results == 0 {
            return Err(config::ConfigError::Message(
                "retrieval.max_results must be at least 1".into(),
            ));
        }

        Ok(Self {
            semantic_limit: query_limit("semantic_limit", settings.semantic_limit)?,
            similarity_threshold: settings.similarity_threshold,
            context_limit: query_limit("context_limit", settings.context_limit)?,
            critical_limit: query_limit("critical_limit", settings.critical_limit)?,
            critical_min_confidence: settings.critical_min_confidence,
            critical_primary_category_qualifies: settings.critical_primary_category_qualifies,
            max_results: settings.max_results,
            max_description_length: settings.max_description_length,
            embedding_timeout: Duration::from_millis(settings.embedding_timeout_ms),
            query_timeout: Duration::from_millis(settings.query_timeout_ms),
            ..Self::default()
        })
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .map_err(|e| config::ConfigError::Message(format!("invalid APP_ENVIRONMENT: {e}")))?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(config_directory.join(environment_filename)).required(false))
        .add_source(
            config::Environment::with_prefix("HAZARD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString, PartialEq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

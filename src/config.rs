//! Service configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 4500;
/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const ENV_HOST: &str = "AGENA_HOST";
const ENV_PORT: &str = "AGENA_PORT";
const ENV_STATIC_DIR: &str = "AGENA_STATIC_DIR";
const ENV_MAX_TASKS: &str = "AGENA_MAX_TASKS";
const ENV_PROJECT_ID: &str = "VERTEX_PROJECT_ID";
const ENV_LOCATION: &str = "VERTEX_LOCATION";
const ENV_MODEL: &str = "VERTEX_MODEL";
const ENV_ACCESS_TOKEN: &str = "VERTEX_ACCESS_TOKEN";
const ENV_BASE_URL: &str = "VERTEX_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "VERTEX_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
    /// Values parse but violate an invariant.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Top-level configuration, built once at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Model provider settings.
    pub vertex: VertexConfig,
    /// Request limits.
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(host) = get(ENV_HOST) {
            config.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            config.server.port = parse_value(ENV_PORT, port)?;
        }
        if let Some(dir) = get(ENV_STATIC_DIR) {
            config.server.static_dir = PathBuf::from(dir);
        }
        if let Some(max) = get(ENV_MAX_TASKS) {
            config.limits.max_tasks = parse_value(ENV_MAX_TASKS, max)?;
        }

        config.vertex.project_id = get(ENV_PROJECT_ID).ok_or(ConfigError::Missing(ENV_PROJECT_ID))?;
        config.vertex.location = get(ENV_LOCATION).ok_or(ConfigError::Missing(ENV_LOCATION))?;
        if let Some(model) = get(ENV_MODEL) {
            config.vertex.model = model;
        }
        config.vertex.access_token = get(ENV_ACCESS_TOKEN);
        config.vertex.base_url = get(ENV_BASE_URL);
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.vertex.request_timeout = Duration::from_secs(parse_value(ENV_TIMEOUT_SECS, secs)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid("vertex.project_id must not be empty".to_string()));
        }
        if self.vertex.location.trim().is_empty() {
            return Err(ConfigError::Invalid("vertex.location must not be empty".to_string()));
        }
        if self.vertex.model.trim().is_empty() {
            return Err(ConfigError::Invalid("vertex.model must not be empty".to_string()));
        }
        if self.vertex.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "vertex.request_timeout must be > 0".to_string(),
            ));
        }
        if self.limits.max_tasks == 0 {
            return Err(ConfigError::Invalid("limits.max_tasks must be > 0".to_string()));
        }
        if let Some(base_url) = &self.vertex.base_url {
            Url::parse(base_url)?;
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory holding `index.html`.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    /// Listen address as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Vertex AI settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VertexConfig {
    /// Google Cloud project.
    pub project_id: String,
    /// Region, e.g. `us-central1`.
    pub location: String,
    /// Publisher model name.
    pub model: String,
    /// OAuth bearer token; omitted from requests when unset.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Endpoint override; derived from the location when unset.
    pub base_url: Option<String>,
    /// Whole-request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: String::new(),
            model: DEFAULT_MODEL.to_string(),
            access_token: None,
            base_url: None,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl VertexConfig {
    /// Create a config for a project and region with default settings.
    #[must_use]
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Override the endpoint base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL actually used for requests.
    #[must_use]
    pub fn effective_base_url(&self) -> String {
        self.base_url.as_ref().map_or_else(
            || format!("https://{}-aiplatform.googleapis.com", self.location),
            |url| url.trim_end_matches('/').to_string(),
        )
    }
}

/// Request limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum tasks accepted per request.
    pub max_tasks: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_tasks: 100 }
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! Configuration loading for prsumma.
//!
//! Everything comes from the process environment, optionally seeded from a `.env` file.
//! The resulting [`Config`] is read once at startup and handed to each component.

use std::fmt;
use thiserror::Error;

/// Default GitHub REST API base
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default Ollama server address
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

pub const DEFAULT_SERVER_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Hosting service access
#[derive(Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// REST API base, without a trailing slash
    pub api_url: String,
}

/// Connection parameters for the result store
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

/// Local model settings
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model name as known to Ollama (e.g. "llama3")
    pub name: String,
    /// Ollama server base URL
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Set-but-blank counts as unset for every variable
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::MissingVar(key));

        let github = GitHubConfig {
            token: required("GITHUB_TOKEN")?,
            owner: required("GITHUB_REPO_OWNER")?,
            repo: required("GITHUB_REPO_NAME")?,
            api_url: optional("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        };

        let database = DatabaseConfig {
            host: required("POSTGRES_HOST")?,
            port: parse_port("POSTGRES_PORT", optional("POSTGRES_PORT"), DEFAULT_POSTGRES_PORT)?,
            dbname: required("POSTGRES_DB")?,
            user: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
        };

        let model = ModelConfig {
            name: required("OLLAMA_MODEL_NAME")?,
            host: optional("OLLAMA_HOST")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
        };

        let server = ServerConfig {
            port: parse_port("PORT", optional("PORT"), DEFAULT_SERVER_PORT)?,
        };

        Ok(Config {
            github,
            database,
            model,
            server,
        })
    }
}

fn parse_port(key: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

// Credentials stay out of logs.
impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[redacted]")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .finish()
    }
}

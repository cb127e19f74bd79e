use std::env;

use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),

    #[error("DATA_PATH cannot be empty")]
    EmptyDataPath,

    #[error("DATABASE_AUTH_TOKEN must be set when DATABASE_URL points to a remote database")]
    MissingAuthToken,
}

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseLocation {
    /// Local libSQL file under the data directory
    Local { data_path: String },
    /// Remote libSQL server (sqld / Turso)
    Remote { url: String, auth_token: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
    pub frontend_origin: String,
}

impl Config {
    /// Read configuration from the process environment.
    /// Call `dotenv::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let raw_port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw_port.clone()))?;

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                let auth_token = lookup("DATABASE_AUTH_TOKEN")
                    .filter(|token| !token.trim().is_empty())
                    .ok_or(ConfigError::MissingAuthToken)?;
                DatabaseLocation::Remote { url, auth_token }
            }
            None => {
                let data_path =
                    lookup("DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
                if data_path.trim().is_empty() {
                    return Err(ConfigError::EmptyDataPath);
                }
                DatabaseLocation::Local { data_path }
            }
        };

        let frontend_origin =
            lookup("FRONTEND_ORIGIN").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());

        Ok(Self {
            host,
            port,
            database,
            frontend_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

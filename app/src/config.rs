use crate::error::ConfigError;
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:80";

#[derive(Debug, Clone)]
pub struct Config {
    database_url: String,
    server_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment, after loading an optional `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let server_addr = bind_addr
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidAddr(bind_addr.clone(), e))?;

        Ok(Config {
            database_url,
            server_addr,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }
}

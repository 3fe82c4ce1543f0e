//! Server settings read from the environment.

use std::env;

const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TEMPLATES_DIR: &str = "templates/**/*";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Signs the flash message cookies. A random key is used when unset.
    pub secret_key: Option<String>,
    /// Glob handed to tera.
    pub templates_dir: String,
    /// Apply embedded migrations at startup.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            secret_key: None,
            templates_dir: DEFAULT_TEMPLATES_DIR.to_string(),
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            address: lookup("ADDRESS").unwrap_or(defaults.address),
            port: lookup("PORT")
                .and_then(|port| port.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            secret_key: lookup("SECRET_KEY").filter(|key| !key.is_empty()),
            templates_dir: lookup("TEMPLATES_DIR").unwrap_or(defaults.templates_dir),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|value| parse_flag(&value))
                .unwrap_or(defaults.run_migrations),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

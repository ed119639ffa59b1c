//! Configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LDAP_URL: &str = "ldap://localhost:389";
pub const DEFAULT_PEOPLE_BASE: &str = "ou=people,dc=esmgquadrivium,dc=nl";
pub const DEFAULT_STATIC_DIR: &str = "./static";
const DEFAULT_LDAP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} environment variable is required"),
            ConfigError::Invalid { key, value } => {
                write!(f, "{key} has an invalid value: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credentials for the staff account created at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,
    pub bind_addr: String,
    /// Raw cookie signing key; validated when the session middleware is built.
    pub session_key: Option<String>,
    pub ldap_url: String,
    /// Directory subtree holding the member entries.
    pub ldap_people_base: String,
    pub ldap_starttls: bool,
    pub ldap_timeout: Duration,
    pub static_dir: String,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Load configuration from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Err(e) if !e.not_found() => log::warn!("Could not read .env file: {e}"),
            _ => {}
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let ldap_starttls = match lookup("LDAP_STARTTLS") {
            None => false,
            Some(v) => {
                parse_bool(&v).ok_or(ConfigError::Invalid { key: "LDAP_STARTTLS", value: v })?
            }
        };

        let ldap_timeout = match lookup("LDAP_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_LDAP_TIMEOUT_SECS),
            Some(v) => v
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { key: "LDAP_TIMEOUT_SECS", value: v })?,
        };

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { username, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_key: lookup("SESSION_KEY"),
            ldap_url: lookup("LDAP_URL").unwrap_or_else(|| DEFAULT_LDAP_URL.to_string()),
            ldap_people_base: lookup("LDAP_PEOPLE_BASE")
                .unwrap_or_else(|| DEFAULT_PEOPLE_BASE.to_string()),
            ldap_starttls,
            ldap_timeout,
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            admin,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

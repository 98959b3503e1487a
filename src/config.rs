//! Environment-driven configuration.
//!
//! Everything is read once at startup through [`AppConfig::from_env`]. An
//! invalid or missing required value is a startup error.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_API_PREFIX: &str = "api";
const DEFAULT_JWT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_CORS_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{key}` has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err("expected one of development, production, test".to_string()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub cors_methods: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub logging: bool,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub silent: bool,
    pub log_requests: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV").or_else(|| get("NODE_ENV")) {
            Some(value) => parse_value("APP_ENV", &value, Environment::from_str)?,
            None => Environment::default(),
        };
        let is_dev = environment == Environment::Development;
        let is_test = environment == Environment::Test;

        let port = match get("PORT") {
            Some(value) => parse_value("PORT", &value, parse_port)?,
            None => DEFAULT_PORT,
        };

        let server = ServerConfig {
            port,
            environment,
            api_prefix: get("API_PREFIX")
                .map(|p| p.trim().trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            cors_origins: split_list(&get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())),
            cors_methods: split_list(&get("CORS_METHODS").unwrap_or_else(|| DEFAULT_CORS_METHODS.into()))
                .into_iter()
                .map(|m| m.to_ascii_uppercase())
                .collect(),
        };

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            expires_in: match get("JWT_EXPIRES_IN") {
                Some(value) => parse_value("JWT_EXPIRES_IN", &value, parse_duration)?,
                None => DEFAULT_JWT_TTL,
            },
        };

        let database = DatabaseConfig {
            url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            logging: parse_flag("DATABASE_LOGGING", get("DATABASE_LOGGING"), is_dev)?,
            run_migrations: parse_flag("DATABASE_MIGRATE", get("DATABASE_MIGRATE"), is_dev)?,
        };

        let logging = LoggingConfig {
            level: match get("LOG_LEVEL") {
                Some(value) => parse_value("LOG_LEVEL", &value, parse_level)?,
                None => default_level(environment),
            },
            silent: parse_flag("LOG_SILENT", get("LOG_SILENT"), is_test)?,
            log_requests: parse_flag("LOG_REQUESTS", get("LOG_REQUESTS"), !is_test)?,
        };

        Ok(Self {
            server,
            jwt,
            database,
            logging,
        })
    }
}

fn parse_value<T>(
    key: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    parse(value.trim()).map_err(|reason| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    })
}

fn parse_flag(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value {
        Some(value) => parse_value(key, &value, |v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err("expected true or false".to_string()),
        }),
        None => Ok(default),
    }
}

fn parse_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) | Err(_) => Err("expected a port between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
    }
}

/// Parse `<n>[s|m|h|d]`; a bare number is seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| "expected a duration like 7d, 12h, 30m or 3600".to_string())?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown duration unit `{other}`")),
    };

    match amount.checked_mul(multiplier) {
        Some(0) => Err("duration must be positive".to_string()),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Err("duration is too large".to_string()),
    }
}

fn parse_level(value: &str) -> Result<Level, String> {
    match value.to_ascii_lowercase().as_str() {
        "verbose" => Ok(Level::TRACE),
        other => other
            .parse()
            .map_err(|_| "expected one of error, warn, info, debug, trace".to_string()),
    }
}

fn default_level(environment: Environment) -> Level {
    match environment {
        Environment::Production => Level::WARN,
        Environment::Test => Level::ERROR,
        Environment::Development => Level::DEBUG,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("JWT_SECRET", "secret"),
        ("DATABASE_URL", "postgres://localhost/blog"),
    ];

    #[test]
    fn defaults_for_development() {
        let config = config_from(&REQUIRED).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.server.api_prefix, "api");
        assert_eq!(config.server.cors_origins.len(), 2);
        assert!(config.server.cors_methods.contains(&"PATCH".to_string()));
        assert_eq!(config.jwt.expires_in, Duration::from_secs(604_800));
        assert!(config.database.logging);
        assert!(config.database.run_migrations);
        assert_eq!(config.logging.level, Level::DEBUG);
        assert!(!config.logging.silent);
        assert!(config.logging.log_requests);
    }

    #[test]
    fn environment_drives_log_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("NODE_ENV", "test"));
        let config = config_from(&vars).unwrap();
        assert_eq!(config.logging.level, Level::ERROR);
        assert!(config.logging.silent);
        assert!(!config.logging.log_requests);

        let mut vars = REQUIRED.to_vec();
        vars.push(("APP_ENV", "production"));
        vars.push(("LOG_LEVEL", "verbose"));
        let config = config_from(&vars).unwrap();
        assert_eq!(config.logging.level, Level::TRACE);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn missing_required_values_fail() {
        let err = config_from(&[("DATABASE_URL", "postgres://x")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "0"));
        assert!(matches!(
            config_from(&vars),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("LOG_SILENT", "maybe"));
        assert!(matches!(
            config_from(&vars),
            Err(ConfigError::Invalid { key: "LOG_SILENT", .. })
        ));
    }

    #[test]
    fn durations_accept_units() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("3w").is_err());
        assert!(parse_duration("d").is_err());
    }

    #[test]
    fn lists_are_trimmed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CORS_ORIGIN", " https://a.example , ,https://b.example"));
        vars.push(("API_PREFIX", "/v1/"));
        let config = config_from(&vars).unwrap();
        assert_eq!(
            config.server.cors_origins,
            ["https://a.example", "https://b.example"]
        );
        assert_eq!(config.server.api_prefix, "v1");
    }
}

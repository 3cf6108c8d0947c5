use std::str::FromStr;

use uuid::Uuid;

use crate::app_config::{ApiKeyGrant, AppConfig, Environment};
use crate::session::{CurrentUser, Role};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation over an injected env lookup, so tests can feed a
/// plain `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_value::<SocketAddr>(var, &or_default(var, default))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("AGENCYDB_ENV", "development"))?;
    let bind_addr = parse("AGENCYDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AGENCYDB_LOG_LEVEL", "info");
    let api_keys = parse_api_keys(&or_default("AGENCYDB_API_KEYS", ""))?;

    let db_max_connections = parse_u32("AGENCYDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AGENCYDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AGENCYDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "AGENCYDB_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        api_keys,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AGENCYDB_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

/// Parse `token:user-uuid:ROLE` triples separated by commas.
fn parse_api_keys(raw: &str) -> Result<Vec<ApiKeyGrant>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "AGENCYDB_API_KEYS".to_string(),
        reason,
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(idx, entry)| {
            let mut parts = entry.splitn(3, ':');
            let (Some(token), Some(user_id), Some(role)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid(format!(
                    "entry {} must look like token:user-uuid:ROLE",
                    idx + 1
                )));
            };
            if token.trim().is_empty() {
                return Err(invalid(format!("entry {} has an empty token", idx + 1)));
            }
            let id = Uuid::parse_str(user_id.trim())
                .map_err(|e| invalid(format!("entry {}: bad user id: {e}", idx + 1)))?;
            let role = role
                .trim()
                .parse::<Role>()
                .map_err(|e| invalid(format!("entry {}: {e}", idx + 1)))?;
            Ok(ApiKeyGrant {
                token: token.trim().to_string(),
                user: CurrentUser::new(id, role),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

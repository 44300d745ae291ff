//! Runtime configuration from environment variables (after `.env` is loaded).

use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/students";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub const ENV_KEYS: &[&str] = &[
    "DATABASE_URL",
    "STUDENT_SCHEMA",
    "BIND_ADDR",
    "DB_MAX_CONNECTIONS",
    "STUDENT_STORE",
    "BODY_LIMIT_BYTES",
];

/// Which repository backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::Invalid {
                key: "STUDENT_STORE",
                reason: format!("{} (expected postgres or memory)", other),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Schema holding the students table. Must be a plain identifier.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub store: StoreKind,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    /// Reads only [`ENV_KEYS`]; unset or non-UTF-8 values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::from_vars(vars)
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = lookup(&vars, "DATABASE_URL").unwrap_or(DEFAULT_DATABASE_URL).to_string();

        let schema = lookup(&vars, "STUDENT_SCHEMA").unwrap_or(DEFAULT_SCHEMA).to_string();
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "STUDENT_SCHEMA",
                reason: format!("{} is not a valid identifier", schema),
            });
        }

        let bind_addr = lookup(&vars, "BIND_ADDR")
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{}", e),
            })?;

        let max_connections = match lookup(&vars, "DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DB_MAX_CONNECTIONS",
                        reason: format!("{} is not a positive integer", v),
                    })
                }
            },
        };

        let store = match lookup(&vars, "STUDENT_STORE") {
            None => StoreKind::Postgres,
            Some(v) => v.parse::<StoreKind>()?,
        };

        let body_limit_bytes = match lookup(&vars, "BODY_LIMIT_BYTES") {
            None => DEFAULT_BODY_LIMIT_BYTES,
            Some(v) => v.parse::<usize>().map_err(|_| ConfigError::Invalid {
                key: "BODY_LIMIT_BYTES",
                reason: format!("{} is not a byte count", v),
            })?,
        };

        Ok(AppConfig {
            database_url,
            schema,
            bind_addr,
            max_connections,
            store,
            body_limit_bytes,
        })
    }
}

/// Blank values count as unset.
fn lookup<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.schema, "public");
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.store, StoreKind::Postgres);
        assert_eq!(cfg.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    }

    #[test]
    fn overrides() {
        let cfg = AppConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://db/school"),
            ("STUDENT_SCHEMA", "school"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("STUDENT_STORE", "memory"),
            ("BODY_LIMIT_BYTES", "2048"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://db/school");
        assert_eq!(cfg.schema, "school");
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(cfg.max_connections, 12);
        assert_eq!(cfg.store, StoreKind::Memory);
        assert_eq!(cfg.body_limit_bytes, 2048);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = AppConfig::from_vars(vars(&[("STUDENT_SCHEMA", "  ")])).unwrap();
        assert_eq!(cfg.schema, "public");
    }

    #[test]
    fn rejects_bad_schema() {
        let err = AppConfig::from_vars(vars(&[("STUDENT_SCHEMA", "bad-name;")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STUDENT_SCHEMA", .. }));
    }

    #[test]
    fn rejects_zero_connections() {
        let err = AppConfig::from_vars(vars(&[("DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. }));
    }

    #[test]
    fn from_env_ignores_unrelated_non_utf8_vars() {
        #[cfg(unix)]
        {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;
            std::env::set_var(OsStr::new("STUDENT_API_TEST_RAW"), OsStr::from_bytes(&[0x66, 0xff, 0x6f]));
        }
        assert!(AppConfig::from_env().is_ok());
    }

    #[test]
    fn rejects_unknown_store() {
        let err = AppConfig::from_vars(vars(&[("STUDENT_STORE", "redis")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STUDENT_STORE", .. }));
    }
}

//! Server configuration loaded from environment variables.
//!
//! Required:
//! - `DATABASE_URL`
//! - `SUPABASE_URL`, `SUPABASE_API_KEY` (when `STORAGE_BACKEND=supabase`, the default)
//!
//! Optional (with defaults from `waypoint_core::defaults`):
//! - `STORAGE_BACKEND` - "supabase" or "filesystem"
//! - `STORAGE_BUCKET`, `CAPTURES_FOLDER`
//! - `FILE_STORAGE_PATH`, `PUBLIC_BASE_URL` (filesystem backend)
//! - `ALLOWED_ORIGINS` - comma-separated CORS allow-list
//! - `HOST`, `PORT`, `MAX_UPLOAD_BYTES`
//! - `DB_MAX_CONNECTIONS` - PostgreSQL pool size

use std::path::PathBuf;

use axum::http::HeaderValue;
use waypoint_core::defaults::{self, *};
use waypoint_core::{Error, Result};

/// Where capture photos are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Supabase Storage bucket.
    Supabase {
        url: String,
        api_key: String,
        bucket: String,
    },
    /// Local directory, served by this process under `/media`.
    Filesystem {
        path: PathBuf,
        public_base_url: String,
    },
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub storage: StorageConfig,
    pub captures_folder: String,
    pub allowed_origins: Vec<HeaderValue>,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                Error::Config(format!("missing required environment variable {}", key))
            })
        };

        let database_url = require(ENV_DATABASE_URL)?;
        let db_max_connections = match get(ENV_DB_MAX_CONNECTIONS) {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "invalid {} '{}': expected a positive integer",
                        ENV_DB_MAX_CONNECTIONS, v
                    )))
                }
            },
            None => defaults::DB_MAX_CONNECTIONS,
        };
        let host = get(ENV_HOST).unwrap_or_else(|| SERVER_HOST.to_string());
        let port = match get(ENV_PORT) {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("invalid {} '{}': {}", ENV_PORT, v, e)))?,
            None => SERVER_PORT,
        };
        let max_upload_bytes = match get(ENV_MAX_UPLOAD_BYTES) {
            Some(v) => v.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("invalid {} '{}': {}", ENV_MAX_UPLOAD_BYTES, v, e))
            })?,
            None => defaults::MAX_UPLOAD_BYTES,
        };

        let backend = get(ENV_STORAGE_BACKEND)
            .unwrap_or_else(|| "supabase".to_string())
            .to_lowercase();
        let storage = match backend.as_str() {
            "supabase" => StorageConfig::Supabase {
                url: require(ENV_SUPABASE_URL)?,
                api_key: require(ENV_SUPABASE_API_KEY)?,
                bucket: get(ENV_STORAGE_BUCKET).unwrap_or_else(|| STORAGE_BUCKET.to_string()),
            },
            "filesystem" => StorageConfig::Filesystem {
                path: get(ENV_FILE_STORAGE_PATH)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./media")),
                public_base_url: get(ENV_PUBLIC_BASE_URL)
                    .unwrap_or_else(|| format!("http://localhost:{}/media", port)),
            },
            other => {
                return Err(Error::Config(format!(
                    "unknown {} '{}' (expected 'supabase' or 'filesystem')",
                    ENV_STORAGE_BACKEND, other
                )))
            }
        };

        Ok(Self {
            database_url,
            db_max_connections,
            storage,
            captures_folder: get(ENV_CAPTURES_FOLDER)
                .unwrap_or_else(|| CAPTURES_FOLDER.to_string()),
            allowed_origins: parse_allowed_origins(lookup(ENV_ALLOWED_ORIGINS).as_deref()),
            host,
            port,
            max_upload_bytes,
        })
    }
}

/// Parse the CORS allow-list from a comma-separated value.
///
/// Unset or blank input yields [`defaults::ALLOWED_ORIGINS`]. Entries that
/// are not valid header values are logged and skipped. A `*` entry is
/// skipped: the allow-list never contains a wildcard.
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let raw = raw.unwrap_or("");
    if raw.trim().is_empty() {
        return defaults::ALLOWED_ORIGINS
            .iter()
            .map(|o| HeaderValue::from_static(o))
            .collect();
    }

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; list origins explicitly");
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SUPABASE_VARS: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/waypoint"),
        ("SUPABASE_URL", "https://proj.supabase.co"),
        ("SUPABASE_API_KEY", "service-key"),
    ];

    #[test]
    fn test_supabase_config_with_defaults() {
        let config = AppConfig::from_lookup(lookup(SUPABASE_VARS)).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.captures_folder, "landmark-captures");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(
            config.storage,
            StorageConfig::Supabase {
                url: "https://proj.supabase.co".to_string(),
                api_key: "service-key".to_string(),
                bucket: "game-assets".to_string(),
            }
        );
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&SUPABASE_VARS[1..])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_missing_supabase_key_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&SUPABASE_VARS[..2])).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_API_KEY"));
    }

    #[test]
    fn test_blank_required_value_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/waypoint"),
            ("SUPABASE_URL", "   "),
            ("SUPABASE_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_filesystem_backend_does_not_need_supabase() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/waypoint"),
            ("STORAGE_BACKEND", "filesystem"),
            ("FILE_STORAGE_PATH", "/tmp/waypoint-media"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Filesystem {
                path: PathBuf::from("/tmp/waypoint-media"),
                public_base_url: "http://localhost:9000/media".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_port_and_backend_rejected() {
        let mut vars = SUPABASE_VARS.to_vec();
        vars.push(("PORT", "eighty"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = SUPABASE_VARS.to_vec();
        vars.push(("STORAGE_BACKEND", "s3"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("s3"));
    }

    #[test]
    fn test_db_pool_size_from_env() {
        let mut vars = SUPABASE_VARS.to_vec();
        vars.push(("DB_MAX_CONNECTIONS", " 12 "));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.db_max_connections, 12);

        for bad in ["0", "-3", "lots"] {
            let mut vars = SUPABASE_VARS.to_vec();
            vars.push(("DB_MAX_CONNECTIONS", bad));
            let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
        }
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let origins = parse_allowed_origins(Some("https://play.example.com"));
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].to_str().unwrap(), "https://play.example.com");

        let origins = parse_allowed_origins(Some(
            "https://play.example.com, http://localhost:5173 , https://staging.example.com",
        ));
        assert_eq!(origins.len(), 3);
        assert_eq!(origins[1].to_str().unwrap(), "http://localhost:5173");

        let origins = parse_allowed_origins(Some(""));
        assert_eq!(origins.len(), defaults::ALLOWED_ORIGINS.len());

        let origins = parse_allowed_origins(None);
        assert_eq!(origins[0].to_str().unwrap(), "http://localhost:5173");
    }

    #[test]
    fn test_allowed_origins_never_include_wildcard() {
        let origins = parse_allowed_origins(Some("*,https://play.example.com"));
        assert_eq!(origins.len(), 1);
        assert!(origins.iter().all(|o| o != "*"));

        // Header values cannot contain control characters.
        let origins = parse_allowed_origins(Some("https://ok.example.com,bad\u{7f}origin"));
        assert_eq!(origins.len(), 1);
    }
}

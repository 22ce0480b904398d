// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the embedded database | `/data` |
//! | `JWT_SECRET` | HS256 signing secret (required, never logged) | — |
//! | `JWT_TTL_HOURS` | Credential time-to-live | `72` |
//! | `JWT_REFRESH_THRESHOLD_HOURS` | Remaining lifetime below which a replacement is issued | `24` |
//! | `LEGACY_APPROVALS` | `1`/`true` to apply admin decisions from any state | off |
//! | `SEED_ADMIN_PHONE` | Create an administrator account with this phone at startup | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::fmt;
use std::path::PathBuf;

use chrono::Duration;

use crate::workflow::TransitionPolicy;

/// Environment variable name for the database directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

const DEFAULT_TTL_HOURS: i64 = 72;
const DEFAULT_REFRESH_THRESHOLD_HOURS: i64 = 24;

/// Credential issuing parameters.
///
/// `Debug` redacts the secret; nothing in this crate ever logs it.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
    pub refresh_threshold: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("refresh_threshold", &self.refresh_threshold)
            .finish()
    }
}

/// Full application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt: JwtConfig,
    pub transition_policy: TransitionPolicy,
    pub seed_admin_phone: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Returns an error message naming the missing or malformed variable;
    /// the secret's value never appears in any message.
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid port number".to_string())?;
        let data_dir =
            PathBuf::from(env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string()));

        let secret =
            env::var(JWT_SECRET_ENV).map_err(|_| format!("{JWT_SECRET_ENV} must be set"))?;
        if secret.is_empty() {
            return Err(format!("{JWT_SECRET_ENV} must not be empty"));
        }
        let ttl = hours_var("JWT_TTL_HOURS", DEFAULT_TTL_HOURS)?;
        let refresh_threshold =
            hours_var("JWT_REFRESH_THRESHOLD_HOURS", DEFAULT_REFRESH_THRESHOLD_HOURS)?;

        let transition_policy = match env::var("LEGACY_APPROVALS").ok().as_deref() {
            Some("1") | Some("true") => TransitionPolicy::Legacy,
            _ => TransitionPolicy::Strict,
        };

        let seed_admin_phone = env::var("SEED_ADMIN_PHONE").ok().filter(|p| !p.is_empty());

        Ok(Self {
            host,
            port,
            data_dir,
            jwt: JwtConfig {
                secret,
                ttl,
                refresh_threshold,
            },
            transition_policy,
            seed_admin_phone,
        })
    }
}

fn hours_var(name: &str, default: i64) -> Result<Duration, String> {
    match env::var(name) {
        Ok(value) => value
            .parse::<i64>()
            .map(Duration::hours)
            .map_err(|_| format!("{name} must be a whole number of hours")),
        Err(_) => Ok(Duration::hours(default)),
    }
}

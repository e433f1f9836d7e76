use std::env;
use std::path::PathBuf;

use crate::session::DEFAULT_SESSION_KEY;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_SESSION_DIR: &str = ".portal-session";

/// AppConfig
///
/// Holds the shell's configuration. Loaded once at startup and never mutated;
/// `main` uses it to pick the log format, build the session store and bind.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log output format.
    pub env: Env,
    // Address the HTTP shell listens on.
    pub bind_addr: String,
    // Directory backing the file session store.
    pub session_dir: PathBuf,
    // The one fixed key the persisted identity lives under.
    pub session_key: String,
}

/// Env
///
/// `Local` logs human-readable output; `Production` logs JSON for aggregation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Test-friendly values; nothing here touches the process environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `PORTAL_BIND_ADDR`, `PORTAL_SESSION_DIR` and
    /// `PORTAL_SESSION_KEY`. Every setting has a default, so loading never fails;
    /// an unrecognized `APP_ENV` or a blank value falls back with a warning.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match read_var("APP_ENV").as_deref() {
            None | Some("local") => Env::Local,
            Some("production") => Env::Production,
            Some(other) => {
                tracing::warn!(value = other, "Unrecognized APP_ENV; using local");
                Env::Local
            }
        };

        Self {
            env,
            bind_addr: read_var("PORTAL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_dir: read_var("PORTAL_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            session_key: read_var("PORTAL_SESSION_KEY").unwrap_or(defaults.session_key),
        }
    }
}

/// Non-blank value of `name`, trimmed.
fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => {
            tracing::warn!(var = name, "Blank environment variable ignored");
            None
        }
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            tracing::warn!(var = name, "Non-unicode environment variable ignored");
            None
        }
    }
}

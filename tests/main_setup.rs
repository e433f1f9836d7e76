use portal_session::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, path::PathBuf};

const CONFIG_VARS: [&str; 4] = [
    "APP_ENV",
    "PORTAL_BIND_ADDR",
    "PORTAL_SESSION_DIR",
    "PORTAL_SESSION_KEY",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: &[&'static str]) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_defaults_when_unset() {
    let config = run_with_env(
        || {
            unsafe {
                for var in CONFIG_VARS {
                    env::remove_var(var);
                }
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    );

    let defaults = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, defaults.bind_addr);
    assert_eq!(config.session_dir, defaults.session_dir);
    assert_eq!(config.session_key, "user");
}

#[test]
#[serial]
fn test_app_config_reads_overrides() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("PORTAL_BIND_ADDR", "0.0.0.0:8080");
                env::set_var("PORTAL_SESSION_DIR", "/var/lib/portal");
                env::set_var("PORTAL_SESSION_KEY", "portal_user");
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.session_dir, PathBuf::from("/var/lib/portal"));
    assert_eq!(config.session_key, "portal_user");
}

#[test]
#[serial]
fn test_app_config_unknown_env_and_blank_values_fall_back() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "staging");
                env::set_var("PORTAL_SESSION_KEY", "   ");
                env::remove_var("PORTAL_BIND_ADDR");
                env::remove_var("PORTAL_SESSION_DIR");
            }
            AppConfig::load()
        },
        &CONFIG_VARS,
    );

    // Unrecognized environments never panic; they run as local.
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.session_key, "user");
}

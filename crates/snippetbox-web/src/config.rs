//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// How long a session lives after it was created.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:4000").
    pub bind_addr: String,

    /// Path to the SQLite database file.
    pub db_path: PathBuf,

    /// Directory served under `/static/`.
    pub static_dir: PathBuf,

    /// Verbose logging.
    pub debug: bool,

    /// Mark the session cookie `Secure`.
    ///
    /// The server itself speaks plain HTTP and expects TLS to be terminated
    /// by a proxy in front of it. Browsers drop `Secure` cookies sent over
    /// plain HTTP to any host but localhost, so turn this off when serving
    /// without such a proxy.
    pub secure_cookies: bool,

    /// Longest time a request may take, body read included, before it is
    /// answered with 408.
    pub request_timeout: Duration,

    /// How often expired session rows are deleted.
    pub session_sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            db_path: PathBuf::from("snippetbox.db"),
            static_dir: PathBuf::from("./ui/static"),
            debug: false,
            secure_cookies: true,
            request_timeout: Duration::from_secs(10),
            session_sweep_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `SNIPPETBOX_ADDR`: Server bind address (default: "0.0.0.0:4000")
    /// - `SNIPPETBOX_DB_PATH`: SQLite database file (default: "snippetbox.db")
    /// - `SNIPPETBOX_STATIC_DIR`: Static asset directory (default: "./ui/static")
    /// - `SNIPPETBOX_DEBUG`: Verbose logging (default: false)
    /// - `SNIPPETBOX_SECURE_COOKIES`: `Secure` cookie attribute (default: true)
    /// - `SNIPPETBOX_REQUEST_TIMEOUT_SECS`: Per-request time limit (default: 10)
    /// - `SNIPPETBOX_SESSION_SWEEP_SECS`: Expired-session sweep period (default: 300)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = std::env::var("SNIPPETBOX_ADDR").unwrap_or(defaults.bind_addr);

        let db_path = std::env::var("SNIPPETBOX_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let static_dir = std::env::var("SNIPPETBOX_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let debug = env_bool("SNIPPETBOX_DEBUG")?.unwrap_or(defaults.debug);

        let secure_cookies =
            env_bool("SNIPPETBOX_SECURE_COOKIES")?.unwrap_or(defaults.secure_cookies);

        let request_timeout =
            env_secs("SNIPPETBOX_REQUEST_TIMEOUT_SECS")?.unwrap_or(defaults.request_timeout);

        let session_sweep_interval = env_secs("SNIPPETBOX_SESSION_SWEEP_SECS")?
            .unwrap_or(defaults.session_sweep_interval);

        Ok(Self {
            bind_addr,
            db_path,
            static_dir,
            debug,
            secure_cookies,
            request_timeout,
            session_sweep_interval,
        })
    }
}

/// Parse an optional, non-zero number of seconds.
fn env_secs(key: &str) -> anyhow::Result<Option<Duration>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };

    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{key} must be a number of seconds"))?;
    if secs == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(Some(Duration::from_secs(secs)))
}

/// Parse an optional boolean environment variable.
fn env_bool(key: &str) -> anyhow::Result<Option<bool>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => anyhow::bail!("{key} must be a boolean, got {other:?}"),
    }
}

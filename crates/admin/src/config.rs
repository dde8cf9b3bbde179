//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL, decides whether cookies are `Secure`
//!   (default: <http://localhost:3001>)
//! - `ADMIN_DEMO_MODE` - Enables demo role switching (default: false)
//! - `ADMIN_LOGIN_LATENCY_MS` - Simulated authenticator latency (default: 1000)
//! - `ADMIN_ANALYSIS_LATENCY_MS` - Scripted analysis latency (default: 3000)
//! - `ADMIN_SUBMISSION_POLICY` - `min:<n>` or `all-categories` (default: `min:2`)
//! - `ADMIN_WORKFLOW_IDLE_SECS` - Evict abandoned workflows after this long (default: 3600)
//!
//! ## Optional (Sentry)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - e.g. "staging"
//! - `SENTRY_SAMPLE_RATE` - 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - 0.0 to 1.0 (default: 1.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::workflow::SubmissionPolicy;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_LOGIN_LATENCY_MS: u64 = 1000;
const DEFAULT_ANALYSIS_LATENCY_MS: u64 = 3000;
const DEFAULT_WORKFLOW_IDLE_SECS: u64 = 3600;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard
    pub base_url: String,
    /// Whether the development-only role switch is available
    pub demo_mode: bool,
    /// Delay applied by the demo authenticator
    pub login_latency: Duration,
    /// Delay applied by the scripted analysis service
    pub analysis_latency: Duration,
    /// Guard applied when a workflow is submitted
    pub submission_policy: SubmissionPolicy,
    /// Idle time after which a browser session's workflow is dropped
    pub workflow_idle: Duration,
    /// Sentry error tracking (optional)
    pub sentry: Option<SentryConfig>,
}

/// Sentry error tracking configuration.
///
/// Implements `Debug` manually because the DSN embeds the project key.
#[derive(Clone)]
pub struct SentryConfig {
    pub dsn: SecretString,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            base_url: format!("http://localhost:{DEFAULT_PORT}"),
            demo_mode: false,
            login_latency: Duration::from_millis(DEFAULT_LOGIN_LATENCY_MS),
            analysis_latency: Duration::from_millis(DEFAULT_ANALYSIS_LATENCY_MS),
            submission_policy: SubmissionPolicy::default(),
            workflow_idle: Duration::from_secs(DEFAULT_WORKFLOW_IDLE_SECS),
            sentry: None,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let env = Source(lookup);

        let host = env.parse("ADMIN_HOST")?.unwrap_or(defaults.host);
        let port = env.parse("ADMIN_PORT")?.unwrap_or(defaults.port);
        let base_url = env
            .get("ADMIN_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let demo_mode = env.flag("ADMIN_DEMO_MODE")?.unwrap_or(defaults.demo_mode);
        let login_latency = env
            .parse("ADMIN_LOGIN_LATENCY_MS")?
            .map_or(defaults.login_latency, Duration::from_millis);
        let analysis_latency = env
            .parse("ADMIN_ANALYSIS_LATENCY_MS")?
            .map_or(defaults.analysis_latency, Duration::from_millis);
        let submission_policy = env
            .parse("ADMIN_SUBMISSION_POLICY")?
            .unwrap_or(defaults.submission_policy);
        let workflow_idle = env
            .parse("ADMIN_WORKFLOW_IDLE_SECS")?
            .map_or(defaults.workflow_idle, Duration::from_secs);

        let sentry = match env.get("SENTRY_DSN") {
            Some(dsn) => Some(SentryConfig {
                dsn: SecretString::from(dsn),
                environment: env.get("SENTRY_ENVIRONMENT"),
                sample_rate: env.parse("SENTRY_SAMPLE_RATE")?.unwrap_or(1.0),
                traces_sample_rate: env.parse("SENTRY_TRACES_SAMPLE_RATE")?.unwrap_or(1.0),
            }),
            None => None,
        };

        Ok(Self {
            host,
            port,
            base_url,
            demo_mode,
            login_latency,
            analysis_latency,
            submission_policy,
            workflow_idle,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the dashboard is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Wraps a key lookup with typed accessors. Empty values count as unset.
struct Source<F>(F);

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    format!("expected a boolean, got '{other}'"),
                )),
            })
            .transpose()
    }
}

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

static DEFAULT_API_URL: &str = "http://localhost:5000";
static ENV_API_URL: &str = "TACKTRACK_API_URL";
static ENV_TIMEOUT_SECS: &str = "TACKTRACK_TIMEOUT_SECS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Values supplied on the command line; each one wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    api_base_url: String,
    request_timeout: Duration,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving each setting from the provided overrides,
    /// environment variables, and built-in defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let api_url = match overrides.api_url {
            Some(url) => url,
            None => env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => match env::var(ENV_TIMEOUT_SECS) {
                Ok(raw) => Some(raw.trim().parse::<u64>().with_context(|| {
                    format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'")
                })?),
                Err(_) => None,
            },
        };

        let timeout = match timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };
        Self::new(&api_url, timeout)
    }

    /// Construct [`AppConfig`] directly from a base URL and timeout.
    pub fn new(api_url: &str, request_timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(api_url.trim())
            .with_context(|| format!("Invalid task API base URL '{api_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Task API base URL must use http or https, got '{}'",
                parsed.scheme()
            ));
        }
        if request_timeout.is_zero() {
            return Err(anyhow!("Request timeout must be greater than zero"));
        }

        Ok(Self {
            api_base_url: api_url.trim().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

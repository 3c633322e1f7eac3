use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:4949";
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_secs(3);
pub const DEFAULT_SUCCESS_BANNER: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings shared by every component that talks to the document service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Delay applied before upload and summary requests are dispatched
    pub simulated_latency: Duration,
    /// How long the "uploaded successfully" banner stays up
    pub success_banner: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            simulated_latency: DEFAULT_SIMULATED_LATENCY,
            success_banner: DEFAULT_SUCCESS_BANNER,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SUMMED_SERVICE_URL`, `SUMMED_LATENCY_MS`,
    /// `SUMMED_BANNER_MS` and `SUMMED_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("SUMMED_SERVICE_URL") {
            config.base_url = url;
        }
        if let Some(ms) = lookup("SUMMED_LATENCY_MS") {
            let value = parse_number("SUMMED_LATENCY_MS", &ms)?;
            config.simulated_latency = Duration::from_millis(value);
        }
        if let Some(ms) = lookup("SUMMED_BANNER_MS") {
            let value = parse_number("SUMMED_BANNER_MS", &ms)?;
            config.success_banner = Duration::from_millis(value);
        }
        if let Some(secs) = lookup("SUMMED_TIMEOUT_SECS") {
            let value = parse_number("SUMMED_TIMEOUT_SECS", &secs)?;
            config.request_timeout = Duration::from_secs(value);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }

    pub fn with_success_banner(mut self, banner: Duration) -> Self {
        self.success_banner = banner;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("service URL is empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "service URL '{}' must start with http:// or https://",
                url
            )));
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| {
            ClientError::Config(format!("{} must be a whole number, got '{}'", key, value))
        })
}

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::ServicesError;

pub const GEOCODER_URL_DEFAULT: &str = "https://nominatim.openstreetmap.org/search";
pub const DIRECTORY_URL_DEFAULT: &str = "http://127.0.0.1:8000";
pub const GEOCODER_URL_ENV: &str = "NEARBY_GEOCODER_URL";
pub const DIRECTORY_URL_ENV: &str = "NEARBY_DIRECTORY_URL";

const USER_AGENT_DEFAULT: &str = concat!("nearby/", env!("CARGO_PKG_VERSION"));
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and transport settings shared by the remote collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    /// Full URL of the geocoding search endpoint (queried with `q` and `format=json`).
    pub geocoder_url: String,
    /// Base URL of the user directory; `/users/`, `/signup` and `/nearby` hang off it.
    pub directory_url: String,
    /// Upper bound on a single request, after which the call counts as a transport failure.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Optional `countrycodes` filter applied to suggestion lookups.
    pub country_codes: Option<String>,
    /// Ask the geocoder for address breakdowns on suggestion lookups.
    pub address_details: bool,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geocoder_url: GEOCODER_URL_DEFAULT.to_string(),
            directory_url: DIRECTORY_URL_DEFAULT.to_string(),
            request_timeout: Duration::from_secs(8),
            user_agent: USER_AGENT_DEFAULT.to_string(),
            country_codes: None,
            address_details: true,
        }
    }
}

impl ServicesConfig {
    pub fn builder() -> ServicesConfigBuilder {
        ServicesConfigBuilder::new()
    }

    /// Defaults with the base URLs overridden from `NEARBY_GEOCODER_URL` / `NEARBY_DIRECTORY_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(GEOCODER_URL_ENV) {
            debug!(url = %url, "Geocoder URL taken from environment");
            config.geocoder_url = url;
        }
        if let Ok(url) = std::env::var(DIRECTORY_URL_ENV) {
            debug!(url = %url, "Directory URL taken from environment");
            config.directory_url = url;
        }
        config
    }

    /// Join a path onto the directory base URL, tolerating a trailing slash on either side.
    pub fn directory_endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.directory_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builder for [`ServicesConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServicesConfigBuilder {
    config: ServicesConfig,
}

impl ServicesConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ServicesConfig::default(),
        }
    }

    /// Start from the environment-aware defaults.
    pub fn from_env() -> Self {
        Self {
            config: ServicesConfig::from_env(),
        }
    }

    pub fn geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.config.geocoder_url = url.into();
        self
    }

    pub fn directory_url(mut self, url: impl Into<String>) -> Self {
        self.config.directory_url = url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Restrict suggestions to a comma separated list of ISO country codes, e.g. `"us"`.
    pub fn country_codes(mut self, codes: impl Into<String>) -> Self {
        self.config.country_codes = Some(codes.into());
        self
    }

    pub fn address_details(mut self, enabled: bool) -> Self {
        self.config.address_details = enabled;
        self
    }

    pub fn build(self) -> Result<ServicesConfig, ServicesError> {
        let config = self.config;
        for (name, url) in [
            ("geocoder_url", &config.geocoder_url),
            ("directory_url", &config.directory_url),
        ] {
            let parsed = Url::parse(url).map_err(|e| {
                ServicesError::Config(format!("{name} is not a valid URL ('{url}'): {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(ServicesError::Config(format!(
                    "{name} must be an http(s) URL with a host, got '{url}'"
                )));
            }
        }
        if config.request_timeout.is_zero() || config.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(ServicesError::Config(format!(
                "request_timeout must be within (0, {}s], got {:?}",
                MAX_REQUEST_TIMEOUT.as_secs(),
                config.request_timeout
            )));
        }
        Ok(config)
    }
}

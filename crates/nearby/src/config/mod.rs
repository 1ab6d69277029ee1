use std::time::Duration;

pub use nearby_services::{ServicesConfig, ServicesConfigBuilder};

use crate::error::NearbyError;

const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Debounce and suggestion-list settings for one address field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteConfig {
    /// Quiet time after the last keystroke before a lookup is issued.
    pub quiet_period: Duration,
    /// Trimmed queries shorter than this (in characters) never reach the geocoder.
    pub min_query_chars: usize,
    /// Maximum number of suggestions shown.
    pub suggestion_limit: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(300),
            min_query_chars: 3,
            suggestion_limit: 5,
        }
    }
}

impl AutocompleteConfig {
    pub fn quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn min_query_chars(mut self, min: usize) -> Self {
        self.min_query_chars = min.max(1);
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit.max(1);
        self
    }
}

/// Policy knobs for the registration and nearby-search workflows.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Substitute demo data when the directory is unreachable instead of failing.
    pub fallback_on_unreachable: bool,
    /// Upper bound for any single collaborator call made by a workflow.
    pub request_timeout: Duration,
    /// Radius offered before the user picks one.
    pub default_radius_miles: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fallback_on_unreachable: true,
            request_timeout: Duration::from_secs(8),
            default_radius_miles: 5.0,
        }
    }
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::new()
    }
}

/// Builder for creating orchestrator configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
        }
    }

    /// Directory failures are reported as errors; nothing is ever synthesized.
    pub fn strict() -> Self {
        Self::new().fallback_on_unreachable(false)
    }

    /// Keep the UI usable without a backend by substituting clearly marked demo data.
    pub fn demo() -> Self {
        Self::new().fallback_on_unreachable(true)
    }

    pub fn fallback_on_unreachable(mut self, enabled: bool) -> Self {
        self.config.fallback_on_unreachable = enabled;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn default_radius_miles(mut self, radius: f64) -> Self {
        self.config.default_radius_miles = radius;
        self
    }

    pub fn build(self) -> Result<OrchestratorConfig, NearbyError> {
        let config = self.config;
        if !(MIN_REQUEST_TIMEOUT..=MAX_REQUEST_TIMEOUT).contains(&config.request_timeout) {
            return Err(NearbyError::ConfigError(format!(
                "request_timeout must be between {}s and {}s, got {:?}",
                MIN_REQUEST_TIMEOUT.as_secs(),
                MAX_REQUEST_TIMEOUT.as_secs(),
                config.request_timeout
            )));
        }
        if !(config.default_radius_miles.is_finite() && config.default_radius_miles > 0.0) {
            return Err(NearbyError::ConfigError(format!(
                "default_radius_miles must be greater than 0, got {}",
                config.default_radius_miles
            )));
        }
        Ok(config)
    }
}

/// Marker appearance handed to the map renderer.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub icon_url: String,
    pub shadow_url: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

const SHADOW_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/images/marker-shadow.png";

impl MarkerStyle {
    fn standard(icon_url: &str) -> Self {
        Self {
            icon_url: icon_url.to_string(),
            shadow_url: SHADOW_URL.to_string(),
            icon_size: (25, 41),
            icon_anchor: (12, 41),
            popup_anchor: (1, -34),
            shadow_size: (41, 41),
        }
    }

    pub fn default_pin() -> Self {
        Self::standard("https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/images/marker-icon.png")
    }

    pub fn green() -> Self {
        Self::standard(
            "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-green.png",
        )
    }

    pub fn red() -> Self {
        Self::standard(
            "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-red.png",
        )
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: u32,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            fill_color: "red".to_string(),
            fill_opacity: 0.1,
            weight: 2,
        }
    }
}

/// Everything the rendering collaborator is configured with. Passed in explicitly; there
/// is no process-wide icon state.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewConfig {
    pub initial_center: (f64, f64),
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub user_marker: MarkerStyle,
    pub nearby_marker: MarkerStyle,
    pub center_marker: MarkerStyle,
    pub circle: CircleStyle,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            // Kenmore / Bothell area
            initial_center: (47.76, -122.24),
            zoom: 11,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                    .to_string(),
            user_marker: MarkerStyle::default_pin(),
            nearby_marker: MarkerStyle::green(),
            center_marker: MarkerStyle::red(),
            circle: CircleStyle::default(),
        }
    }
}

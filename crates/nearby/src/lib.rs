//! Nearby - address search and radius discovery pipeline
//!
//! Nearby lets a user register a location and discover other registered users within a
//! chosen radius. It orchestrates two remote collaborators, a geocoder and a user directory,
//! and hands a finished [`ResultProjection`] to whatever draws the map.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nearby::{
//!     NearbySearchForm, OrchestratorConfigBuilder, RegistrationForm, SearchOrchestrator,
//!     ServicesConfig,
//! };
//!
//! # async fn run() -> Result<(), nearby::error::NearbyError> {
//! let services = ServicesConfig::from_env();
//! let config = OrchestratorConfigBuilder::demo().build()?;
//! let mut orchestrator = SearchOrchestrator::from_services(&services, config)?;
//!
//! orchestrator.load_users().await;
//!
//! let mut form = RegistrationForm::new("PuppyParent", "1 Main St, Bothell");
//! let status = orchestrator.register(&mut form).await;
//! println!("{status}");
//!
//! let status = orchestrator
//!     .search_nearby(&NearbySearchForm::new("1 Main St, Bothell", 5.0))
//!     .await;
//! if status.is_degraded() {
//!     println!("Showing demo data: {status}");
//! }
//! let projection = orchestrator.projection();
//! println!("{} users nearby", projection.nearby_users.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Outcomes
//!
//! Every workflow reports a [`Status`] that is one of:
//! - **Success**: the collaborators answered; the data is authoritative.
//! - **Degraded**: the directory was unreachable and clearly marked demo data (`Demo: ...`)
//!   stands in. Synthesized records always carry negative ids.
//! - **Failed**: nothing changed; the message says why.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod autocomplete;
mod config;
pub mod error;
mod orchestrator;
mod projection;
mod render;
mod status;

pub use autocomplete::{AutocompleteController, AutocompleteSnapshot, SuggestionPhase};
pub use config::{
    AutocompleteConfig, CircleStyle, MapViewConfig, MarkerStyle, OrchestratorConfig,
    OrchestratorConfigBuilder, ServicesConfig, ServicesConfigBuilder,
};
pub use nearby_services as services;
pub use nearby_services::{
    AddressCandidate, DirectoryClient, DirectoryError, GeocodeError, GeocodeResolver, NearbyQuery,
    NewUser, User,
};
pub use orchestrator::{
    NearbySearchForm, RegistrationForm, SYNTHETIC_REGISTRATION_CEILING, SearchOrchestrator,
    Workflow, WorkflowError, demo_directory_users, demo_nearby_users,
};
pub use projection::{METERS_PER_MILE, ResultProjection, SearchCenter};
pub use render::{Circle, MapScene, Marker, MarkerKind};
pub use status::{DEGRADED_MARKER, Status, StatusKind};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Nearby library.
///
/// This sets up structured logging with configurable levels and filtering.
/// `RUST_LOG` takes precedence over `level` when set. Calling this again after a
/// successful initialisation does nothing.
///
/// # Examples
///
/// ```rust
/// use nearby::init_logging;
/// use tracing::Level;
///
/// // Initialize with info-level logging
/// init_logging(Level::INFO)?;
/// # Ok::<(), nearby::error::NearbyError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::NearbyError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

//! End-to-end workflows: resolve an address, act against the directory, degrade gracefully.
//!
//! Shared state (`all_users` and the latest nearby results with their centre) is only touched
//! after every await of a workflow has completed, in one synchronous step. Dropping a workflow
//! future part-way therefore leaves the state exactly as it was.

use std::{future::Future, sync::Arc, time::Duration};

use nearby_services::{
    AddressCandidate, DirectoryClient, DirectoryError, GeocodeError, GeocodeResolver, NearbyQuery,
    NewUser, User,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub use error::WorkflowError;
pub use fallback::{SYNTHETIC_REGISTRATION_CEILING, demo_directory_users, demo_nearby_users};

use crate::{
    autocomplete::AutocompleteController,
    config::{AutocompleteConfig, OrchestratorConfig},
    projection::{NearbyResults, ResultProjection, SearchCenter},
    status::Status,
};

mod fallback;

use fallback::SyntheticIds;

/// Which workflow a status message describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    ListUsers,
    Register,
    SearchNearby,
}

/// Input of the registration workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub username: String,
    pub address: String,
    /// Suggestion explicitly picked for `address`; skips the geocoder when it still matches.
    pub selection: Option<AddressCandidate>,
}

impl RegistrationForm {
    pub fn new(username: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            address: address.into(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, candidate: AddressCandidate) -> Self {
        self.address.clone_from(&candidate.display_name);
        self.selection = Some(candidate);
        self
    }

    pub fn clear(&mut self) {
        self.username.clear();
        self.address.clear();
        self.selection = None;
    }
}

/// Input of the nearby-search workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchForm {
    pub address: String,
    pub radius_miles: f64,
    pub selection: Option<AddressCandidate>,
}

impl NearbySearchForm {
    pub fn new(address: impl Into<String>, radius_miles: f64) -> Self {
        Self {
            address: address.into(),
            radius_miles,
            selection: None,
        }
    }

    pub fn with_selection(mut self, candidate: AddressCandidate) -> Self {
        self.address.clone_from(&candidate.display_name);
        self.selection = Some(candidate);
        self
    }
}

/// Composes the geocoder and the directory into the registration and nearby-search workflows.
///
/// Every public workflow returns a [`Status`]; errors never escape. Every state change
/// republishes a freshly derived [`ResultProjection`] to subscribers.
pub struct SearchOrchestrator {
    geocoder: Arc<dyn GeocodeResolver>,
    directory: Arc<dyn DirectoryClient>,
    config: OrchestratorConfig,
    all_users: Vec<User>,
    nearby: Option<NearbyResults>,
    synthetic_ids: SyntheticIds,
    projection_tx: watch::Sender<ResultProjection>,
}

impl SearchOrchestrator {
    pub fn new(
        geocoder: Arc<dyn GeocodeResolver>,
        directory: Arc<dyn DirectoryClient>,
        config: OrchestratorConfig,
    ) -> Self {
        let (projection_tx, _) = watch::channel(ResultProjection::default());
        Self {
            geocoder,
            directory,
            config,
            all_users: Vec::new(),
            nearby: None,
            synthetic_ids: SyntheticIds::default(),
            projection_tx,
        }
    }

    /// Wire the orchestrator to the HTTP geocoder and directory described by `services`.
    #[cfg(feature = "http")]
    pub fn from_services(
        services: &nearby_services::ServicesConfig,
        config: OrchestratorConfig,
    ) -> crate::error::Result<Self> {
        let geocoder = nearby_services::NominatimResolver::new(services)?;
        let directory = nearby_services::HttpDirectoryClient::new(services)?;
        Ok(Self::new(Arc::new(geocoder), Arc::new(directory), config))
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// A suggestion controller for an address field, backed by the same geocoder.
    pub fn autocomplete(&self, config: AutocompleteConfig) -> AutocompleteController {
        AutocompleteController::with_config(Arc::clone(&self.geocoder), config)
    }

    /// Nearby-search form pre-filled with the configured default radius.
    pub fn nearby_form(&self, address: impl Into<String>) -> NearbySearchForm {
        NearbySearchForm::new(address, self.config.default_radius_miles)
    }

    pub fn projection(&self) -> ResultProjection {
        ResultProjection::derive(&self.all_users, self.nearby.as_ref())
    }

    /// Receive every projection recomputed from now on; the current one is marked seen.
    pub fn subscribe(&self) -> watch::Receiver<ResultProjection> {
        self.projection_tx.subscribe()
    }

    /// Forget the last nearby search.
    pub fn clear_search(&mut self) {
        self.nearby = None;
        self.publish();
    }

    /// Load the directory listing into `all_users`.
    #[instrument(name = "Load users", skip(self), level = "info")]
    pub async fn load_users(&mut self) -> Status {
        let result = self.bounded(self.directory.list_users()).await;
        let status = match result {
            Ok(users) => {
                let status = Status::success(format!("Loaded {} users", users.len()));
                self.all_users = users;
                self.publish();
                status
            }
            Err(DirectoryError::Unreachable(reason)) if self.config.fallback_on_unreachable => {
                warn!(reason = %reason, "Directory unreachable, showing demo users");
                let users = demo_directory_users();
                let status = Status::degraded(format!(
                    "Directory unavailable, showing {} sample users",
                    users.len()
                ));
                self.all_users = users;
                self.publish();
                status
            }
            Err(e) => WorkflowError::from(e).status(Workflow::ListUsers),
        };
        info!(kind = ?status.kind, outcome = %status.message, "Load users finished");
        status
    }

    /// Register `form.username` at the resolved `form.address`.
    ///
    /// Inputs are cleared on success and on a degraded success; on any failure the form is
    /// left alone so the user can correct and resubmit.
    #[instrument(name = "Register user", skip(self, form), fields(username = %form.username), level = "info")]
    pub async fn register(&mut self, form: &mut RegistrationForm) -> Status {
        let status = match self.try_register(form).await {
            Ok(status) => {
                form.clear();
                status
            }
            Err(e) => e.status(Workflow::Register),
        };
        info!(kind = ?status.kind, outcome = %status.message, "Registration finished");
        status
    }

    async fn try_register(&mut self, form: &RegistrationForm) -> Result<Status, WorkflowError> {
        let username = required(&form.username, "Username")?;
        let address = required(&form.address, "Address")?;

        let candidate = self
            .resolve_address(address, form.selection.as_ref())
            .await?;
        let new_user = NewUser {
            username: username.to_string(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
        };

        match self.bounded(self.directory.register_user(&new_user)).await {
            Ok(user) => {
                let status = Status::success(format!("User {} created!", user.username));
                self.upsert_user(user);
                self.publish();
                Ok(status)
            }
            Err(DirectoryError::Unconfirmed { username }) => {
                // Created remotely; the record shows up with its real id on the next listing.
                info!(username = %username, "Registration acknowledged without a readable record");
                Ok(Status::success(format!("User {username} created!")))
            }
            Err(DirectoryError::Unreachable(reason)) if self.config.fallback_on_unreachable => {
                let user = User::new(
                    self.synthetic_ids.next_id(),
                    new_user.username,
                    new_user.latitude,
                    new_user.longitude,
                );
                warn!(reason = %reason, id = user.id, "Directory unreachable, registering locally");
                let status =
                    Status::degraded(format!("User {} created successfully!", user.username));
                self.upsert_user(user);
                self.publish();
                Ok(status)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find directory users within `form.radius_miles` of the resolved `form.address`.
    ///
    /// On success the nearby users and the search centre are replaced together.
    #[instrument(name = "Search nearby", skip(self, form), fields(address = %form.address, radius_miles = form.radius_miles), level = "info")]
    pub async fn search_nearby(&mut self, form: &NearbySearchForm) -> Status {
        let status = self
            .try_search_nearby(form)
            .await
            .unwrap_or_else(|e| e.status(Workflow::SearchNearby));
        info!(kind = ?status.kind, outcome = %status.message, "Nearby search finished");
        status
    }

    async fn try_search_nearby(&mut self, form: &NearbySearchForm) -> Result<Status, WorkflowError> {
        let address = required(&form.address, "Address")?;
        let radius_miles = form.radius_miles;
        if !(radius_miles.is_finite() && radius_miles > 0.0) {
            return Err(WorkflowError::InvalidInput(
                "Radius must be greater than 0".to_string(),
            ));
        }

        let candidate = self
            .resolve_address(address, form.selection.as_ref())
            .await?;
        let query = NearbyQuery {
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            radius_miles,
        };
        let center = SearchCenter {
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            radius_miles,
            address_label: form.address.clone(),
        };

        let (users, status) = match self.bounded(self.directory.search_nearby(&query)).await {
            Ok(users) => {
                let status = Status::success(format!("Found {} users nearby", users.len()));
                (users, status)
            }
            Err(DirectoryError::Unreachable(reason)) if self.config.fallback_on_unreachable => {
                warn!(reason = %reason, "Directory unreachable, substituting demo neighbours");
                let users = demo_nearby_users(query.latitude, query.longitude, radius_miles);
                let status = Status::degraded(format!(
                    "Found {} sample users nearby (directory unavailable)",
                    users.len()
                ));
                (users, status)
            }
            Err(e) => return Err(e.into()),
        };

        self.nearby = Some(NearbyResults { center, users });
        self.publish();
        Ok(status)
    }

    /// Coordinates for `address`: the picked suggestion when it still matches, otherwise the
    /// geocoder's top candidate.
    async fn resolve_address(
        &self,
        address: &str,
        selection: Option<&AddressCandidate>,
    ) -> Result<AddressCandidate, WorkflowError> {
        if let Some(candidate) = selection.filter(|c| c.display_name.trim() == address) {
            debug!(address, "Using picked suggestion");
            return Ok(candidate.clone());
        }
        let candidates = self
            .bounded_geocode(self.geocoder.resolve(address))
            .await?;
        candidates
            .into_iter()
            .next()
            .ok_or(WorkflowError::NotFound)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, DirectoryError>>,
    ) -> Result<T, DirectoryError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| Err(DirectoryError::unreachable(timed_out(timeout))))
    }

    async fn bounded_geocode<T>(
        &self,
        call: impl Future<Output = Result<T, GeocodeError>>,
    ) -> Result<T, GeocodeError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| Err(GeocodeError::unavailable(timed_out(timeout))))
    }

    /// Append, or replace in place when the id is already listed.
    fn upsert_user(&mut self, user: User) {
        if let Some(existing) = self.all_users.iter_mut().find(|u| u.id == user.id) {
            *existing = user;
        } else {
            self.all_users.push(user);
        }
    }

    fn publish(&self) {
        self.projection_tx.send_replace(self.projection());
    }
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("config", &self.config)
            .field("all_users", &self.all_users.len())
            .field("nearby", &self.nearby)
            .finish_non_exhaustive()
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(WorkflowError::InvalidInput(format!(
            "{field} is a required field"
        )))
    } else {
        Ok(trimmed)
    }
}

fn timed_out(timeout: Duration) -> String {
    format!("no answer within {timeout:?}")
}

mod error {
    use nearby_services::{DirectoryError, GeocodeError};
    use thiserror::Error;

    use super::Workflow;
    use crate::status::Status;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum WorkflowError {
        /// Local validation failure; nothing reached the network.
        #[error("{0}")]
        InvalidInput(String),
        #[error("Address not found")]
        NotFound,
        #[error("Address lookup failed: {0}")]
        ResolverUnavailable(String),
        #[error("Directory unreachable: {0}")]
        Unreachable(String),
        #[error("{0}")]
        Rejected(String),
    }

    impl WorkflowError {
        /// The terminal status shown for this error.
        pub fn status(&self, workflow: Workflow) -> Status {
            let message = match self {
                Self::InvalidInput(message) | Self::Rejected(message) => message.clone(),
                Self::NotFound => "Address not found".to_string(),
                Self::ResolverUnavailable(_) => "Error with address lookup".to_string(),
                Self::Unreachable(_) => match workflow {
                    Workflow::ListUsers => "Error fetching users",
                    Workflow::Register => "Error signing up",
                    Workflow::SearchNearby => "Error searching nearby users",
                }
                .to_string(),
            };
            Status::failed(message)
        }
    }

    impl From<GeocodeError> for WorkflowError {
        fn from(e: GeocodeError) -> Self {
            match e {
                GeocodeError::EmptyQuery => Self::InvalidInput("Address is a required field".to_string()),
                GeocodeError::NotFound { .. } => Self::NotFound,
                GeocodeError::Unavailable(reason) => Self::ResolverUnavailable(reason),
            }
        }
    }

    impl From<DirectoryError> for WorkflowError {
        fn from(e: DirectoryError) -> Self {
            match e {
                DirectoryError::Unreachable(reason) => Self::Unreachable(reason),
                DirectoryError::Rejected { message } => Self::Rejected(message),
                unconfirmed @ DirectoryError::Unconfirmed { .. } => {
                    Self::Unreachable(unconfirmed.to_string())
                }
            }
        }
    }
}

//! Remote collaborators of the nearby search pipeline.
//!
//! This crate holds the shared data model ([`User`], [`AddressCandidate`]), the two async
//! collaborator contracts ([`GeocodeResolver`], [`DirectoryClient`]) and, behind the default
//! `http` feature, their reqwest implementations:
//!
//! - [`NominatimResolver`] for `GET <geocoder>?q=<text>&format=json[&limit=N]`
//! - [`HttpDirectoryClient`] for `GET /users/`, `POST /signup` and `POST /nearby`
//!
//! Both transports enforce the configured request timeout, so a hung collaborator surfaces
//! as [`GeocodeError::Unavailable`] or [`DirectoryError::Unreachable`] instead of stalling.

pub mod config;
pub mod directory;
pub mod geocode;
pub mod models;
pub mod wire;

pub use config::{ServicesConfig, ServicesConfigBuilder};
#[cfg(feature = "http")]
pub use directory::HttpDirectoryClient;
pub use directory::{DirectoryClient, DirectoryError};
#[cfg(feature = "http")]
pub use geocode::NominatimResolver;
pub use geocode::{GeocodeError, GeocodeResolver};
pub use models::{AddressCandidate, NearbyQuery, NewUser, User};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ServicesError {
        #[cfg(feature = "http")]
        #[error("HTTP client error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("Configuration error: {0}")]
        Config(String),
    }

    pub type Result<T> = std::result::Result<T, ServicesError>;
}

pub use error::{Result, ServicesError};

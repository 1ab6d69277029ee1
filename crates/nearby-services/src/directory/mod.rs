//! Backend user directory: listing, registration and radius search.
//!
//! Implementations perform exactly one logical call per operation and never retry;
//! fallback policy belongs to the caller.

use async_trait::async_trait;

pub use error::DirectoryError;

use crate::models::{NearbyQuery, NewUser, User};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpDirectoryClient;

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Every registered user, in directory order.
    async fn list_users(&self) -> Result<Vec<User>, DirectoryError>;

    /// Register `new_user` and return the record the directory created.
    ///
    /// Once the directory has acknowledged the registration this never reports
    /// [`DirectoryError::Unreachable`]; an acknowledged record that cannot be read back is
    /// [`DirectoryError::Unconfirmed`].
    async fn register_user(&self, new_user: &NewUser) -> Result<User, DirectoryError>;

    /// Users within `query.radius_miles` of the query point, in directory order.
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<User>, DirectoryError>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum DirectoryError {
        /// Transport failure, timeout, server error or an unreadable answer.
        #[error("Directory unreachable: {0}")]
        Unreachable(String),
        /// The directory refused a registration; `message` is passed through verbatim.
        ///
        /// Only [`DirectoryClient::register_user`](super::DirectoryClient::register_user)
        /// reports this. Reads that are refused count as [`Self::Unreachable`].
        #[error("{message}")]
        Rejected { message: String },
        /// The directory acknowledged a registration but the created record could not be read
        /// back. The user exists remotely; its id is not known yet.
        #[error("User '{username}' created but not yet visible in the directory")]
        Unconfirmed { username: String },
    }

    impl DirectoryError {
        pub fn unreachable(reason: impl ToString) -> Self {
            Self::Unreachable(reason.to_string())
        }

        pub fn rejected(message: impl Into<String>) -> Self {
            Self::Rejected {
                message: message.into(),
            }
        }

        pub fn unconfirmed(username: impl Into<String>) -> Self {
            Self::Unconfirmed {
                username: username.into(),
            }
        }

        pub fn is_unreachable(&self) -> bool {
            matches!(self, Self::Unreachable(_))
        }
    }
}

//! Free-text address to coordinate resolution.
//!
//! A [`GeocodeResolver`] turns an address string into ranked [`AddressCandidate`]s. It is
//! consulted by autocomplete (many cheap lookups, capped result count) and by the submit
//! workflows (one lookup, first candidate wins).

use async_trait::async_trait;

pub use error::GeocodeError;

use crate::models::AddressCandidate;

#[cfg(feature = "http")]
mod nominatim;
#[cfg(feature = "http")]
pub use nominatim::NominatimResolver;

#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Resolve `query` to candidates in rank order.
    ///
    /// Never returns an empty vector: an empty answer is reported as [`GeocodeError::NotFound`].
    /// Lookups have no side effects, so repeating one for an identical query is harmless.
    async fn resolve(&self, query: &str) -> Result<Vec<AddressCandidate>, GeocodeError>;

    /// Lookup used for suggestion lists; at most `limit` candidates.
    async fn suggest(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let mut candidates = self.resolve(query).await?;
        candidates.truncate(limit);
        Ok(candidates)
    }
}

/// Trimmed query, or [`GeocodeError::EmptyQuery`] when nothing is left.
pub fn normalize_query(query: &str) -> Result<&str, GeocodeError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(GeocodeError::EmptyQuery)
    } else {
        Ok(trimmed)
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum GeocodeError {
        #[error("Address query is empty")]
        EmptyQuery,
        #[error("No address matches '{query}'")]
        NotFound { query: String },
        #[error("Geocoder unavailable: {0}")]
        Unavailable(String),
    }

    impl GeocodeError {
        pub fn not_found(query: impl Into<String>) -> Self {
            Self::NotFound {
                query: query.into(),
            }
        }

        pub fn unavailable(reason: impl ToString) -> Self {
            Self::Unavailable(reason.to_string())
        }
    }
}

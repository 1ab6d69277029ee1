use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::{GeocodeError, GeocodeResolver, normalize_query};
use crate::{
    ServicesError,
    config::ServicesConfig,
    models::AddressCandidate,
    wire::{GeocodePlace, candidates_from_places},
};

/// Geocoder speaking the Nominatim search protocol:
/// `GET <endpoint>?q=<text>&format=json[&limit=N]`.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: Client,
    endpoint: String,
    country_codes: Option<String>,
    address_details: bool,
}

impl NominatimResolver {
    pub fn new(config: &ServicesConfig) -> Result<Self, ServicesError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing client. Its timeout, if any, is the one that applies.
    pub fn with_client(client: Client, config: &ServicesConfig) -> Self {
        Self {
            client,
            endpoint: config.geocoder_url.clone(),
            country_codes: config.country_codes.clone(),
            address_details: config.address_details,
        }
    }

    async fn lookup(
        &self,
        query: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let query = normalize_query(query)?;
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json")])
            .query(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!(error = %e, "Geocoder request failed");
                GeocodeError::unavailable(e)
            })?;

        let places: Vec<GeocodePlace> = response.json().await.map_err(|e| {
            warn!(error = %e, "Geocoder returned an unreadable body");
            GeocodeError::unavailable(e)
        })?;

        let candidates = candidates_from_places(&places);
        debug!(query, candidates = candidates.len(), "Geocoder lookup complete");
        if candidates.is_empty() {
            return Err(GeocodeError::not_found(query));
        }
        Ok(candidates)
    }
}

#[async_trait]
impl GeocodeResolver for NominatimResolver {
    #[instrument(name = "Geocode address", skip(self), level = "debug")]
    async fn resolve(&self, query: &str) -> Result<Vec<AddressCandidate>, GeocodeError> {
        self.lookup(query, &[]).await
    }

    #[instrument(name = "Geocode suggestions", skip(self), level = "debug")]
    async fn suggest(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.clone()));
        }
        if self.address_details {
            params.push(("addressdetails", "1".to_string()));
        }
        let mut candidates = self.lookup(query, &params).await?;
        candidates.truncate(limit);
        Ok(candidates)
    }
}

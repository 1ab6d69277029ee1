//! JSON shapes exchanged with the geocoder and the directory.

use itertools::Itertools;
use serde::Deserialize;
use tracing::warn;

use crate::models::{AddressCandidate, User, is_valid_coordinate};

/// One entry of a geocoder search response. Coordinates arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodePlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl GeocodePlace {
    pub fn to_candidate(&self) -> Option<AddressCandidate> {
        let latitude = self.lat.trim().parse::<f64>().ok()?;
        let longitude = self.lon.trim().parse::<f64>().ok()?;
        is_valid_coordinate(latitude, longitude)
            .then(|| AddressCandidate::new(self.display_name.clone(), latitude, longitude))
    }
}

/// Convert a response to candidates, keeping geocoder rank order.
///
/// Entries whose coordinates do not parse or are out of range are dropped.
pub fn candidates_from_places(places: &[GeocodePlace]) -> Vec<AddressCandidate> {
    let (candidates, rejected): (Vec<_>, Vec<_>) = places
        .iter()
        .map(|place| (place, place.to_candidate()))
        .partition(|(_, candidate)| candidate.is_some());
    if !rejected.is_empty() {
        warn!(
            rejected = rejected.len(),
            names = %rejected.iter().map(|(place, _)| place.display_name.as_str()).join(" | "),
            "Dropping geocoder entries with unusable coordinates"
        );
    }
    candidates
        .into_iter()
        .filter_map(|(_, candidate)| candidate)
        .collect()
}

/// User as the directory reports it after signup. Older deployments answer with `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Signup acknowledgement: either `{"user": {...}}` or the bare user object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignupResponse {
    Wrapped { user: SignupUser },
    Flat(SignupUser),
}

impl SignupResponse {
    pub fn into_user(self) -> SignupUser {
        match self {
            Self::Wrapped { user } | Self::Flat(user) => user,
        }
    }
}

impl SignupUser {
    /// Complete the record from the submitted registration when the directory omits fields.
    /// Returns `None` when the directory did not report an id.
    pub fn into_user(self, latitude: f64, longitude: f64) -> Option<User> {
        Some(User {
            id: self.id?,
            username: self.username,
            latitude: self.latitude.unwrap_or(latitude),
            longitude: self.longitude.unwrap_or(longitude),
        })
    }
}

/// Human readable message from a directory error body.
///
/// Looks at `detail`, `message` and `error` string fields (in that order), then at a
/// `detail` list of validation entries with `msg`, and finally falls back to the raw body.
pub fn rejection_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    if let Some(message) = ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
    {
        return Some(message.to_string());
    }
    if let Some(entries) = value.get("detail").and_then(serde_json::Value::as_array) {
        let joined = entries
            .iter()
            .filter_map(|entry| entry.get("msg").and_then(serde_json::Value::as_str))
            .join("; ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    if let Some(message) = value.as_str() {
        return Some(message.to_string());
    }
    Some(trimmed.to_string())
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// A registered member of the user directory.
///
/// The directory owns these records; clients only ever hold read-only copies.
/// Ids at or above zero are assigned by the directory, negative ids are reserved
/// for records synthesized locally while the directory is unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            username: username.into(),
            latitude,
            longitude,
        }
    }

    /// Whether this record was synthesized locally rather than assigned by the directory.
    pub fn is_synthetic(&self) -> bool {
        self.id < 0
    }

    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {{ id: {}, username: \"{}\", lat: {}, lon: {} }}",
            self.id, self.username, self.latitude, self.longitude
        )
    }
}

/// Payload for registering a new user at a resolved position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Radius query against the directory. `radius` is expressed in miles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "radius")]
    pub radius_miles: f64,
}

/// One ranked answer from a geocoding lookup. The first candidate of a lookup is the best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressCandidate {
    pub fn new(display_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            display_name: display_name.into(),
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for AddressCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.5}, {:.5})",
            self.display_name, self.latitude, self.longitude
        )
    }
}

/// Latitude in [-90, 90] and longitude in [-180, 180], both finite.
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

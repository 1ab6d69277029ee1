//! Renderer-facing view of the search state.
//!
//! A [`ResultProjection`] is rebuilt from scratch after every state change; renderers are
//! expected to diff on user ids, not on the identity of the projection value.

use itertools::Itertools;
use nearby_services::User;

/// Meters per statute mile, used to size the search circle for drawing.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Where the last successful nearby search was centred, and how far it reached.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCenter {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_miles: f64,
    /// The address text exactly as the user submitted it.
    pub address_label: String,
}

impl SearchCenter {
    pub fn radius_meters(&self) -> f64 {
        self.radius_miles * METERS_PER_MILE
    }
}

/// Result of one nearby search. Users and centre only ever travel together.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyResults {
    pub(crate) center: SearchCenter,
    pub(crate) users: Vec<User>,
}

/// Snapshot handed to the map renderer and the textual results list.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultProjection {
    pub all_users: Vec<User>,
    pub nearby_users: Vec<User>,
    pub center: Option<SearchCenter>,
}

impl ResultProjection {
    pub(crate) fn derive(all_users: &[User], nearby: Option<&NearbyResults>) -> Self {
        let (nearby_users, center) = nearby.map_or_else(
            || (Vec::new(), None),
            |results| (results.users.clone(), Some(results.center.clone())),
        );
        Self {
            all_users: all_users.to_vec(),
            nearby_users,
            center,
        }
    }

    /// Search radius in meters for drawing, if a search centre is set.
    pub fn radius_meters(&self) -> Option<f64> {
        self.center.as_ref().map(SearchCenter::radius_meters)
    }

    /// Usernames for the "Nearby Users Found" list, in result order.
    pub fn nearby_usernames(&self) -> Vec<&str> {
        self.nearby_users
            .iter()
            .map(|user| user.username.as_str())
            .collect()
    }

    /// Whether any record in the projection was synthesized locally.
    pub fn has_synthetic_entries(&self) -> bool {
        self.all_users
            .iter()
            .chain(&self.nearby_users)
            .any(User::is_synthetic)
    }

    /// Ids that appear more than once in `all_users`; renderers key markers on them.
    pub fn duplicate_ids(&self) -> Vec<i64> {
        self.all_users
            .iter()
            .map(|user| user.id)
            .duplicates()
            .collect()
    }
}

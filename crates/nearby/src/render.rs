//! Drawable scene for the external map renderer.
//!
//! Pure derivation from a [`ResultProjection`] and a [`MapViewConfig`]; no geospatial logic
//! beyond converting the search radius to meters.

use crate::{
    config::{CircleStyle, MapViewConfig, MarkerStyle},
    projection::ResultProjection,
};

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    User,
    Nearby,
    SearchCenter,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Stable key for diffing: `user-<id>`, `nearby-<id>` or `center`.
    pub key: String,
    pub kind: MarkerKind,
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
    pub style: MarkerStyle,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub style: CircleStyle,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub initial_center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub circle: Option<Circle>,
}

impl MapScene {
    /// Directory users first, then nearby results, then the search centre.
    pub fn from_projection(projection: &ResultProjection, config: &MapViewConfig) -> Self {
        let users = projection.all_users.iter().map(|user| Marker {
            key: format!("user-{}", user.id),
            kind: MarkerKind::User,
            latitude: user.latitude,
            longitude: user.longitude,
            popup: user.username.clone(),
            style: config.user_marker.clone(),
        });
        let nearby = projection.nearby_users.iter().map(|user| Marker {
            key: format!("nearby-{}", user.id),
            kind: MarkerKind::Nearby,
            latitude: user.latitude,
            longitude: user.longitude,
            popup: format!("Nearby: {}", user.username),
            style: config.nearby_marker.clone(),
        });
        let center = projection.center.iter().map(|center| Marker {
            key: "center".to_string(),
            kind: MarkerKind::SearchCenter,
            latitude: center.latitude,
            longitude: center.longitude,
            popup: format!("Search Center: {}", center.address_label),
            style: config.center_marker.clone(),
        });

        Self {
            initial_center: config.initial_center,
            zoom: config.zoom,
            markers: users.chain(nearby).chain(center).collect(),
            circle: projection.center.as_ref().map(|center| Circle {
                latitude: center.latitude,
                longitude: center.longitude,
                radius_meters: center.radius_meters(),
                style: config.circle.clone(),
            }),
        }
    }

    pub fn markers_of(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |marker| marker.kind == kind)
    }
}

//! Demo data substituted while the directory is unreachable.
//!
//! Every record produced here has a negative id. The ranges are disjoint from each other and
//! from directory-assigned ids, so renderers keyed on ids never see a collision:
//!
//! | source                     | ids                      |
//! |----------------------------|--------------------------|
//! | directory                  | `>= 0`                   |
//! | demo directory listing     | `-1 ..= -4`              |
//! | demo nearby results        | `-101 ..= -103`          |
//! | synthesized registrations  | `<= -1_000_000`          |

use chrono::{DateTime, Utc};
use nearby_services::User;

/// Synthesized registrations never get an id above this.
pub const SYNTHETIC_REGISTRATION_CEILING: i64 = -1_000_000;

const MILES_PER_DEGREE_LATITUDE: f64 = 69.0;

/// Directory stand-ins around Kenmore / Bothell.
pub fn demo_directory_users() -> Vec<User> {
    vec![
        User::new(-1, "DogLover123", 47.7511, -122.1983),
        User::new(-2, "PuppyParent", 47.7749, -122.2034),
        User::new(-3, "GoldenRetrieverFan", 47.7558, -122.2156),
        User::new(-4, "LabradorLover", 47.6740, -122.1215),
    ]
}

/// (id, username, north fraction of radius, east fraction of radius)
const DEMO_NEIGHBOURS: [(i64, &str, f64, f64); 3] = [
    (-101, "BeagleBuddy", 0.30, 0.20),
    (-102, "CorgiCrew", -0.25, 0.35),
    (-103, "PoodlePal", 0.10, -0.40),
];

/// Fixed set of plausible neighbours around a search centre.
///
/// Offsets are fixed fractions of the radius, so every neighbour lands inside the search
/// circle and the same inputs always give the same positions.
pub fn demo_nearby_users(latitude: f64, longitude: f64, radius_miles: f64) -> Vec<User> {
    let lat_degrees_per_mile = 1.0 / MILES_PER_DEGREE_LATITUDE;
    let lon_degrees_per_mile =
        1.0 / (MILES_PER_DEGREE_LATITUDE * latitude.to_radians().cos().abs().max(0.01));

    DEMO_NEIGHBOURS
        .iter()
        .map(|&(id, username, north, east)| {
            let lat = latitude + north * radius_miles * lat_degrees_per_mile;
            let lon = longitude + east * radius_miles * lon_degrees_per_mile;
            User::new(id, username, lat.clamp(-90.0, 90.0), wrap_longitude(lon))
        })
        .collect()
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Hands out ids for locally synthesized registrations.
///
/// Ids are derived from the wall clock (negated unix milliseconds) and strictly decrease,
/// so two registrations within the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct SyntheticIds {
    last: Option<i64>,
}

impl SyntheticIds {
    pub fn next_id(&mut self) -> i64 {
        self.next_at(Utc::now())
    }

    fn next_at(&mut self, now: DateTime<Utc>) -> i64 {
        let candidate = (-now.timestamp_millis()).min(SYNTHETIC_REGISTRATION_CEILING);
        let id = match self.last {
            Some(last) if candidate >= last => last - 1,
            _ => candidate,
        };
        self.last = Some(id);
        id
    }
}

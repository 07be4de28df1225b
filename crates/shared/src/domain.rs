use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(MarkerId);

/// Radius applied to a search when the caller does not pick one.
pub const DEFAULT_SEARCH_RADIUS_METERS: i32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// One discoverable place as held client-side for the current result set.
///
/// `place_id` is an opaque backend identifier and may be empty; when it is,
/// `identity` falls back to the display name and uniqueness is not assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouristLocation {
    pub name: String,
    pub place_id: String,
    pub position: Coordinate,
    pub rating: Option<f32>,
    pub image_url: Option<String>,
}

impl TouristLocation {
    pub fn identity(&self) -> &str {
        if self.place_id.is_empty() {
            &self.name
        } else {
            &self.place_id
        }
    }
}

/// By-value snapshot handed from the map screen to the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailContext {
    pub place_name: String,
    pub position: Coordinate,
    pub image_url: Option<String>,
}

impl From<&TouristLocation> for DetailContext {
    fn from(location: &TouristLocation) -> Self {
        Self {
            place_name: location.name.clone(),
            position: location.position,
            image_url: location.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub center: Coordinate,
    pub radius_meters: i32,
}

impl SearchRequest {
    pub fn new(center: Coordinate) -> Self {
        Self {
            center,
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }

    pub fn with_radius(center: Coordinate, radius_meters: i32) -> Self {
        Self {
            center,
            radius_meters,
        }
    }
}

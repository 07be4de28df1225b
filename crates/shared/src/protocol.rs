//! Wire shapes for the places backend. Both endpoints are JSON POSTs; field
//! names follow the server exactly, so these types are the only place where
//! snake_case wire naming leaks in.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Coordinate, SearchRequest, TouristLocation},
    error::DomainError,
};

pub const NEARBY_SEARCH_PATH: &str = "/tourist-locations/";
pub const PLACE_DETAIL_PATH: &str = "/place-details/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbySearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i32,
}

impl From<&SearchRequest> for NearbySearchRequest {
    fn from(request: &SearchRequest) -> Self {
        Self {
            latitude: request.center.latitude,
            longitude: request.center.longitude,
            radius: request.radius_meters,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub place_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl TryFrom<PlaceRecord> for TouristLocation {
    type Error = DomainError;

    fn try_from(record: PlaceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            position: Coordinate::new(record.latitude, record.longitude)?,
            name: record.name,
            place_id: record.place_id,
            rating: record.rating,
            image_url: record.image_url,
        })
    }
}

/// `place_id` is allowed to be empty; the backend resolves by name in that
/// case and the client does not enforce a stricter contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailRequest {
    pub place_id: String,
    pub place_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailResponse {
    pub history: String,
}

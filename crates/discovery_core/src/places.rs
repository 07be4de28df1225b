//! HTTP client for the places backend: nearby search and narrated history.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{SearchRequest, TouristLocation},
    protocol::{
        NearbySearchRequest, PlaceDetailRequest, PlaceDetailResponse, PlaceRecord,
        NEARBY_SEARCH_PATH, PLACE_DETAIL_PATH,
    },
};

use crate::error::FetchError;

#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    /// Returns locations in server order; the client never resorts them.
    async fn nearby(&self, request: &SearchRequest) -> Result<Vec<TouristLocation>, FetchError>;
    /// `place_id` may be empty; the backend then resolves by name alone.
    async fn history(&self, place_id: &str, place_name: &str) -> Result<String, FetchError>;
}

pub struct MissingPlaceDirectory;

#[async_trait]
impl PlaceDirectory for MissingPlaceDirectory {
    async fn nearby(&self, _request: &SearchRequest) -> Result<Vec<TouristLocation>, FetchError> {
        Err(FetchError::network(anyhow!("places backend unavailable")))
    }

    async fn history(&self, _place_id: &str, place_name: &str) -> Result<String, FetchError> {
        Err(FetchError::network(anyhow!(
            "places backend unavailable for '{place_name}'"
        )))
    }
}

pub struct PlacesClient {
    http: Client,
    base_url: String,
}

impl PlacesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl PlaceDirectory for PlacesClient {
    async fn nearby(&self, request: &SearchRequest) -> Result<Vec<TouristLocation>, FetchError> {
        if request.radius_meters <= 0 {
            return Err(FetchError::InvalidRadius(request.radius_meters));
        }

        let records: Vec<PlaceRecord> = self
            .http
            .post(self.endpoint(NEARBY_SEARCH_PATH))
            .json(&NearbySearchRequest::from(request))
            .send()
            .await
            .map_err(FetchError::network)?
            .error_for_status()
            .map_err(FetchError::network)?
            .json()
            .await
            .map_err(FetchError::network)?;

        let mut locations = Vec::with_capacity(records.len());
        for record in records {
            locations.push(TouristLocation::try_from(record).map_err(FetchError::network)?);
        }
        tracing::debug!(count = locations.len(), "nearby search resolved");
        Ok(locations)
    }

    async fn history(&self, place_id: &str, place_name: &str) -> Result<String, FetchError> {
        let body = PlaceDetailRequest {
            place_id: place_id.to_string(),
            place_name: place_name.to_string(),
        };
        let response: PlaceDetailResponse = self
            .http
            .post(self.endpoint(PLACE_DETAIL_PATH))
            .json(&body)
            .send()
            .await
            .map_err(FetchError::network)?
            .error_for_status()
            .map_err(FetchError::network)?
            .json()
            .await
            .map_err(FetchError::network)?;
        Ok(response.history)
    }
}

#[cfg(test)]
#[path = "tests/places_tests.rs"]
mod tests;

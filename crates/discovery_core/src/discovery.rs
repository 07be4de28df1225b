//! Map-screen orchestration: one search action per user gesture, plus the
//! permission/camera startup sequence and the popup-to-detail hand-off.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use shared::domain::{Coordinate, DetailContext, MarkerId, SearchRequest};
use tokio::sync::broadcast;

use crate::{
    collaborators::{DeviceLocationProvider, MapSurface},
    places::PlaceDirectory,
    registry::MarkerRegistry,
};

/// Camera start when the device has no last-known position.
pub fn default_camera_target() -> Coordinate {
    Coordinate {
        latitude: 25.4195,
        longitude: 81.8848,
    }
}

pub const DEFAULT_CAMERA_ZOOM: f32 = 15.0;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// User-facing outcomes of the map screen, emitted as non-blocking
/// notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    Searching,
    Populated { count: usize },
    NoLocationsFound,
    SearchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
}

pub struct DiscoveryController {
    directory: Arc<dyn PlaceDirectory>,
    registry: Arc<MarkerRegistry>,
    map: Arc<dyn MapSurface>,
    events: broadcast::Sender<DiscoveryEvent>,
    searches_in_flight: AtomicUsize,
}

impl DiscoveryController {
    pub fn new(
        directory: Arc<dyn PlaceDirectory>,
        registry: Arc<MarkerRegistry>,
        map: Arc<dyn MapSurface>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            directory,
            registry,
            map,
            events,
            searches_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.events.subscribe()
    }

    pub fn registry(&self) -> &Arc<MarkerRegistry> {
        &self.registry
    }

    pub fn phase(&self) -> SearchPhase {
        if self.searches_in_flight.load(Ordering::SeqCst) > 0 {
            SearchPhase::Searching
        } else {
            SearchPhase::Idle
        }
    }

    /// Search at the current camera target (the find-locations gesture).
    pub async fn search_here(&self) {
        self.start_search(self.map.camera_target()).await;
    }

    /// One search action. Success replaces the whole marker set (even when
    /// empty, which clears stale markers); failure leaves the set untouched.
    ///
    /// Re-entrancy is allowed: a search started while another is in flight
    /// is not cancelled, and results apply in arrival order. That relaxed
    /// last-write-wins ordering is deliberate and pinned down in tests.
    pub async fn start_search(&self, center: Coordinate) {
        self.searches_in_flight.fetch_add(1, Ordering::SeqCst);
        let _ = self.events.send(DiscoveryEvent::Searching);
        tracing::info!(
            latitude = center.latitude,
            longitude = center.longitude,
            "starting nearby search"
        );

        let request = SearchRequest::new(center);
        match self.directory.nearby(&request).await {
            Ok(locations) if locations.is_empty() => {
                self.registry.replace_all(&[]);
                let _ = self.events.send(DiscoveryEvent::NoLocationsFound);
            }
            Ok(locations) => {
                let count = self.registry.replace_all(&locations);
                tracing::info!(count, "nearby search populated markers");
                let _ = self.events.send(DiscoveryEvent::Populated { count });
            }
            Err(err) => {
                tracing::warn!(error = %err, "nearby search failed");
                let _ = self
                    .events
                    .send(DiscoveryEvent::SearchFailed(err.to_string()));
            }
        }
        self.searches_in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Startup sequence once the map widget is ready: ask for the coarse
    /// location permission, and on grant enable the my-location overlay and
    /// center the camera on the last-known position. Denial skips both
    /// silently.
    pub async fn on_map_ready(&self, location: &dyn DeviceLocationProvider) {
        if !location.request_coarse_permission().await {
            tracing::debug!("location permission denied; skipping my-location setup");
            return;
        }
        self.map.set_my_location_enabled(true);
        let start = location
            .last_known_position()
            .await
            .unwrap_or_else(default_camera_target);
        self.map.move_camera(start, DEFAULT_CAMERA_ZOOM);
    }

    /// Snapshot for the popup-click hand-off to the detail screen. Returns
    /// `None` when the marker is no longer part of the current result set.
    pub fn detail_context(&self, marker: MarkerId) -> Option<DetailContext> {
        self.registry
            .tag(marker)
            .map(|location| DetailContext::from(&location))
    }
}

#[cfg(test)]
#[path = "tests/discovery_tests.rs"]
mod tests;

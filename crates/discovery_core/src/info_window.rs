//! Popup rendering for map markers.
//!
//! The toolkit pulls `render_contents` synchronously right before a popup
//! becomes visible, so the view is built from cached place data and a
//! placeholder image; the real image arrives later on an async load. The
//! toolkit cannot refresh popup contents in place, so a load that lands
//! while the popup is open forces a hide/show cycle of that popup.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::MarkerId;

use crate::{
    collaborators::{ImageLoader, LoadedImage, MapSurface},
    error::ImageLoadError,
    registry::MarkerRegistry,
};

/// The single capability the map toolkit needs for custom popups.
pub trait InfoWindowAdapter: Send + Sync {
    fn render_contents(&self, marker: MarkerId) -> InfoWindowView;
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfoWindowImage {
    Placeholder,
    Ready(LoadedImage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWindowView {
    pub title: String,
    pub rating: Option<f32>,
    pub image: InfoWindowImage,
}

impl InfoWindowView {
    fn empty() -> Self {
        Self {
            title: String::new(),
            rating: None,
            image: InfoWindowImage::Placeholder,
        }
    }
}

struct PresenterInner {
    registry: Arc<MarkerRegistry>,
    map: Arc<dyn MapSurface>,
    images: Arc<dyn ImageLoader>,
    runtime: tokio::runtime::Handle,
    views: Mutex<HashMap<MarkerId, InfoWindowView>>,
    loads_in_flight: Mutex<HashSet<(MarkerId, u64)>>,
}

#[derive(Clone)]
pub struct InfoWindowPresenter {
    inner: Arc<PresenterInner>,
}

impl InfoWindowPresenter {
    pub fn new(
        registry: Arc<MarkerRegistry>,
        map: Arc<dyn MapSurface>,
        images: Arc<dyn ImageLoader>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            inner: Arc::new(PresenterInner {
                registry,
                map,
                images,
                runtime,
                views: Mutex::new(HashMap::new()),
                loads_in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    fn views(&self) -> MutexGuard<'_, HashMap<MarkerId, InfoWindowView>> {
        self.inner.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loads(&self) -> MutexGuard<'_, HashSet<(MarkerId, u64)>> {
        self.inner
            .loads_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_image_load(&self, marker: MarkerId, url: String) {
        let generation = self.inner.registry.generation();
        if !self.loads().insert((marker, generation)) {
            return;
        }
        let presenter = self.clone();
        self.inner.runtime.spawn(async move {
            let outcome = presenter.inner.images.load(&url).await;
            presenter.finish_image_load(marker, generation, outcome);
        });
    }

    /// Completion side of the image-load race. Re-reads the registry rather
    /// than trusting anything captured at render time: the popup may have
    /// closed, reopened for another marker, or the whole marker set may have
    /// been replaced while the load was in flight.
    fn finish_image_load(
        &self,
        marker: MarkerId,
        generation: u64,
        outcome: Result<LoadedImage, ImageLoadError>,
    ) {
        self.loads().remove(&(marker, generation));

        if self.inner.registry.generation() != generation
            || !self.inner.registry.contains(marker)
        {
            tracing::debug!(marker = marker.0, "image arrived for a replaced marker");
            self.views().remove(&marker);
            return;
        }

        let image = match outcome {
            Ok(loaded) => InfoWindowImage::Ready(loaded),
            Err(err) => {
                // Never leave the image region blank.
                tracing::warn!(marker = marker.0, error = %err, "info window image load failed");
                InfoWindowImage::Placeholder
            }
        };
        let refreshed = matches!(image, InfoWindowImage::Ready(_));

        {
            let mut views = self.views();
            match views.get_mut(&marker) {
                Some(view) => view.image = image,
                // Popup view discarded since render; cache for the next open.
                None => {
                    let mut view = self
                        .inner
                        .registry
                        .tag(marker)
                        .map(|location| InfoWindowView {
                            title: location.name,
                            rating: location.rating,
                            image: InfoWindowImage::Placeholder,
                        })
                        .unwrap_or_else(InfoWindowView::empty);
                    view.image = image;
                    views.insert(marker, view);
                }
            }
        }

        if refreshed && self.inner.map.is_info_window_shown(marker) {
            self.inner.map.hide_info_window(marker);
            self.inner.map.show_info_window(marker);
        }
    }
}

impl InfoWindowAdapter for InfoWindowPresenter {
    fn render_contents(&self, marker: MarkerId) -> InfoWindowView {
        let Some(location) = self.inner.registry.tag(marker) else {
            tracing::debug!(marker = marker.0, "render requested for unknown marker");
            return InfoWindowView::empty();
        };

        let cached_image = self.views().get(&marker).map(|view| view.image.clone());
        let view = InfoWindowView {
            title: location.name.clone(),
            rating: location.rating,
            image: cached_image.unwrap_or(InfoWindowImage::Placeholder),
        };
        self.views().insert(marker, view.clone());

        if matches!(view.image, InfoWindowImage::Placeholder) {
            if let Some(url) = location.image_url.as_deref() {
                if !url.is_empty() {
                    self.spawn_image_load(marker, url.to_string());
                }
            }
        }
        view
    }
}

#[cfg(test)]
#[path = "tests/info_window_tests.rs"]
mod tests;

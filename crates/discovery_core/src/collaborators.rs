//! Seams for the platform collaborators: the map widget toolkit, the device
//! location service, the image pipeline, the speech synthesizer, and the
//! external navigation hand-off. The core only ever talks to these traits.

use async_trait::async_trait;
use shared::domain::{Coordinate, MarkerId};
use url::Url;

use crate::error::{ImageLoadError, NavigationError, SpeechError};

/// Marker and camera operations supplied by the map toolkit. Calls are
/// synchronous toolkit callbacks and must not block.
pub trait MapSurface: Send + Sync {
    fn add_marker(&self, position: Coordinate, title: &str) -> MarkerId;
    fn remove_marker(&self, marker: MarkerId);
    fn camera_target(&self) -> Coordinate;
    fn move_camera(&self, target: Coordinate, zoom: f32);
    fn is_info_window_shown(&self, marker: MarkerId) -> bool;
    fn hide_info_window(&self, marker: MarkerId);
    fn show_info_window(&self, marker: MarkerId);
    fn set_my_location_enabled(&self, enabled: bool);
}

#[async_trait]
pub trait DeviceLocationProvider: Send + Sync {
    /// Resolves once the permission dialog is answered.
    async fn request_coarse_permission(&self) -> bool;
    async fn last_known_position(&self) -> Option<Coordinate>;
}

/// Decoded RGBA image as handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<LoadedImage, ImageLoadError>;
}

/// Fetches over HTTP and decodes with the `image` crate.
pub struct HttpImageLoader {
    http: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<LoadedImage, ImageLoadError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let decoded = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(LoadedImage {
            width: decoded.width(),
            height: decoded.height(),
            rgba: decoded.into_raw(),
        })
    }
}

/// On-device text-to-speech engine. One instance is owned by one detail
/// screen at a time; `shutdown` releases it for good.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Resolves when the engine reports ready or failed.
    async fn initialize(&self) -> Result<(), SpeechError>;
    fn set_locale(&self, locale: &str);
    /// `flush_queue` replaces any utterance already playing.
    fn speak(&self, text: &str, flush_queue: bool);
    fn stop(&self);
    fn is_speaking(&self) -> bool;
    fn shutdown(&self);
}

pub struct MissingSpeechSynthesizer;

#[async_trait]
impl SpeechSynthesizer for MissingSpeechSynthesizer {
    async fn initialize(&self) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn set_locale(&self, _locale: &str) {}

    fn speak(&self, _text: &str, _flush_queue: bool) {}

    fn stop(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }

    fn shutdown(&self) {}
}

/// Hands a deep link to whatever application claims it. Resolution failures
/// stay the launcher's concern; the core logs and moves on.
pub trait NavigationLauncher: Send + Sync {
    fn launch(&self, uri: &Url, preferred_app: &str) -> Result<(), NavigationError>;
}

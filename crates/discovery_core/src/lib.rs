//! Client-side core of the location-aware discovery app: turn a map
//! coordinate into rendered, tagged markers, keep popup images coherent
//! across the async load race, and drive the detail screen (narrated
//! history, speech playback, navigation hand-off).
//!
//! Platform pieces live behind the traits in [`collaborators`]; everything
//! here is toolkit-agnostic and runs on a tokio runtime with a single
//! logical UI thread resuming all state mutation.

pub mod collaborators;
pub mod detail;
pub mod discovery;
pub mod error;
pub mod info_window;
pub mod places;
pub mod registry;

pub use collaborators::{
    DeviceLocationProvider, HttpImageLoader, ImageLoader, LoadedImage, MapSurface,
    MissingSpeechSynthesizer, NavigationLauncher, SpeechSynthesizer,
};
pub use detail::{
    DetailController, DetailEvent, HistoryState, HISTORY_FAILURE_TEXT, NAVIGATION_HANDLER_APP,
    SPEECH_LOCALE,
};
pub use discovery::{
    default_camera_target, DiscoveryController, DiscoveryEvent, SearchPhase, DEFAULT_CAMERA_ZOOM,
};
pub use error::{FetchError, ImageLoadError, NavigationError, SpeechError};
pub use info_window::{InfoWindowAdapter, InfoWindowImage, InfoWindowPresenter, InfoWindowView};
pub use places::{MissingPlaceDirectory, PlaceDirectory, PlacesClient};
pub use registry::MarkerRegistry;

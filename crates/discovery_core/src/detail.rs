//! Detail-screen orchestration: concurrent speech-engine init and history
//! fetch, playback control over the fetched text, and the navigation deep
//! link.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use shared::domain::{Coordinate, DetailContext};
use tokio::sync::broadcast;
use url::Url;

use crate::{
    collaborators::{NavigationLauncher, SpeechSynthesizer},
    places::PlaceDirectory,
};

pub const SPEECH_LOCALE: &str = "en-IN";
/// Shown (and therefore speakable) when the history fetch fails.
pub const HISTORY_FAILURE_TEXT: &str = "Failed to load history.";
pub const NAVIGATION_HANDLER_APP: &str = "com.google.android.apps.maps";

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryState {
    NotRequested,
    Loading,
    Loaded(String),
    Failed(String),
}

impl HistoryState {
    /// Text as it appears on screen; empty until the fetch resolves.
    pub fn display_text(&self) -> &str {
        match self {
            Self::NotRequested | Self::Loading => "",
            Self::Loaded(text) | Self::Failed(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    /// Busy indicator up: the history fetch is in flight.
    HistoryLoading,
    /// Busy indicator down; inspect `history()` for the text. Fires on
    /// failure too, so the indicator never sticks.
    HistoryResolved,
    /// Play was pressed before any history text was on screen.
    HistoryNotLoaded,
    SpeechStarted,
    SpeechStopped,
}

pub struct DetailController {
    context: DetailContext,
    directory: Arc<dyn PlaceDirectory>,
    speech: Arc<dyn SpeechSynthesizer>,
    navigator: Arc<dyn NavigationLauncher>,
    history: Mutex<HistoryState>,
    events: broadcast::Sender<DetailEvent>,
    closed: AtomicBool,
}

impl DetailController {
    /// Renders from the snapshot synchronously and kicks off the two
    /// independent startup effects: speech-engine init and the history
    /// fetch. Neither gates the other.
    pub fn open(
        context: DetailContext,
        directory: Arc<dyn PlaceDirectory>,
        speech: Arc<dyn SpeechSynthesizer>,
        navigator: Arc<dyn NavigationLauncher>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let controller = Arc::new(Self {
            context,
            directory,
            speech,
            navigator,
            history: Mutex::new(HistoryState::NotRequested),
            events,
            closed: AtomicBool::new(false),
        });
        controller.spawn_speech_init();
        controller.spawn_history_fetch();
        controller
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DetailEvent> {
        self.events.subscribe()
    }

    pub fn context(&self) -> &DetailContext {
        &self.context
    }

    pub fn history(&self) -> HistoryState {
        self.lock_history().clone()
    }

    fn lock_history(&self) -> MutexGuard<'_, HistoryState> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_speech_init(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match controller.speech.initialize().await {
                Ok(()) => controller.speech.set_locale(SPEECH_LOCALE),
                // Engine absence degrades silently: playback guards only
                // ever report missing text, never a missing engine.
                Err(err) => tracing::warn!(error = %err, "speech engine init failed"),
            }
        });
    }

    fn spawn_history_fetch(self: &Arc<Self>) {
        *self.lock_history() = HistoryState::Loading;

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let _ = controller.events.send(DetailEvent::HistoryLoading);
            // place_id is deliberately empty; the backend resolves by
            // display name.
            let outcome = controller
                .directory
                .history("", &controller.context.place_name)
                .await;

            if controller.closed.load(Ordering::SeqCst) {
                tracing::debug!("detail screen closed; discarding history result");
                return;
            }

            let state = match outcome {
                Ok(text) => HistoryState::Loaded(text),
                Err(err) => {
                    tracing::warn!(error = %err, "history fetch failed");
                    HistoryState::Failed(HISTORY_FAILURE_TEXT.to_string())
                }
            };
            *controller.lock_history() = state;
            let _ = controller.events.send(DetailEvent::HistoryResolved);
        });
    }

    /// Starts playback of whatever history text is on screen, replacing any
    /// prior utterance. Blank text, including a server-returned empty
    /// history, only yields a "not loaded yet" notification.
    pub fn play_history(&self) {
        let text = self.lock_history().display_text().to_string();
        if text.trim().is_empty() {
            let _ = self.events.send(DetailEvent::HistoryNotLoaded);
            return;
        }
        self.speech.speak(&text, true);
        let _ = self.events.send(DetailEvent::SpeechStarted);
    }

    /// No-op unless currently speaking.
    pub fn stop_history(&self) {
        if self.speech.is_speaking() {
            self.speech.stop();
            let _ = self.events.send(DetailEvent::SpeechStopped);
        }
    }

    /// Hands a driving-directions deep link for this place to the external
    /// navigation application.
    pub fn navigate(&self) {
        let uri = match driving_directions_uri(self.context.position) {
            Ok(uri) => uri,
            Err(err) => {
                tracing::error!(error = %err, "failed to build navigation uri");
                return;
            }
        };
        if let Err(err) = self.navigator.launch(&uri, NAVIGATION_HANDLER_APP) {
            tracing::warn!(error = %err, "navigation hand-off failed");
        }
    }

    /// Deterministic teardown: stop playback if any and release the engine.
    /// An in-flight history fetch may still complete; its result is
    /// discarded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.speech.is_speaking() {
            self.speech.stop();
        }
        self.speech.shutdown();
    }
}

pub fn driving_directions_uri(position: Coordinate) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}&travelmode=driving",
        position.latitude, position.longitude
    ))
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;

use super::*;
use std::{
    sync::atomic::AtomicUsize,
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::domain::{SearchRequest, TouristLocation};
use tokio::sync::Semaphore;

use crate::error::{FetchError, NavigationError, SpeechError};

struct TestSpeech {
    init_ok: bool,
    locale: Mutex<Option<String>>,
    spoken: Mutex<Vec<(String, bool)>>,
    speaking: AtomicBool,
    stops: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl TestSpeech {
    fn new(init_ok: bool) -> Arc<Self> {
        Arc::new(Self {
            init_ok,
            locale: Mutex::new(None),
            spoken: Mutex::new(Vec::new()),
            speaking: AtomicBool::new(false),
            stops: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        })
    }

    fn spoken(&self) -> Vec<(String, bool)> {
        self.spoken.lock().expect("spoken").clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for TestSpeech {
    async fn initialize(&self) -> Result<(), SpeechError> {
        if self.init_ok {
            Ok(())
        } else {
            Err(SpeechError::InitFailed)
        }
    }

    fn set_locale(&self, locale: &str) {
        *self.locale.lock().expect("locale") = Some(locale.to_string());
    }

    fn speak(&self, text: &str, flush_queue: bool) {
        self.spoken
            .lock()
            .expect("spoken")
            .push((text.to_string(), flush_queue));
        self.speaking.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct TestNavigator {
    launches: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl TestNavigator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            launches: Mutex::new(Vec::new()),
            fail,
        })
    }
}

impl NavigationLauncher for TestNavigator {
    fn launch(&self, uri: &Url, preferred_app: &str) -> Result<(), NavigationError> {
        self.launches
            .lock()
            .expect("launches")
            .push((uri.as_str().to_string(), preferred_app.to_string()));
        if self.fail {
            return Err(NavigationError::new(uri.as_str()));
        }
        Ok(())
    }
}

/// History backend stub; a zero-permit gate holds the fetch in flight until
/// the test releases it.
struct HistoryDirectory {
    gate: Semaphore,
    response: Option<String>,
    completed: AtomicUsize,
}

impl HistoryDirectory {
    fn ready(text: &str) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(1),
            response: Some(text.to_string()),
            completed: AtomicUsize::new(0),
        })
    }

    fn gated(text: &str) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            response: Some(text.to_string()),
            completed: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(1),
            response: None,
            completed: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PlaceDirectory for HistoryDirectory {
    async fn nearby(&self, _request: &SearchRequest) -> Result<Vec<TouristLocation>, FetchError> {
        Err(FetchError::network(anyhow!("not under test")))
    }

    async fn history(&self, _place_id: &str, _place_name: &str) -> Result<String, FetchError> {
        let _permit = self.gate.acquire().await.expect("gate");
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(FetchError::network(anyhow!("history backend down"))),
        }
    }
}

fn context() -> DetailContext {
    DetailContext {
        place_name: "Sangam".to_string(),
        position: Coordinate {
            latitude: 25.452,
            longitude: 81.839,
        },
        image_url: Some("http://x/i.jpg".to_string()),
    }
}

fn open(
    directory: &Arc<HistoryDirectory>,
    speech: &Arc<TestSpeech>,
    navigator: &Arc<TestNavigator>,
) -> (Arc<DetailController>, broadcast::Receiver<DetailEvent>) {
    let controller = DetailController::open(
        context(),
        Arc::clone(directory) as Arc<dyn PlaceDirectory>,
        Arc::clone(speech) as Arc<dyn SpeechSynthesizer>,
        Arc::clone(navigator) as Arc<dyn NavigationLauncher>,
    );
    let events = controller.subscribe_events();
    (controller, events)
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

fn drain(rx: &mut broadcast::Receiver<DetailEvent>) -> Vec<DetailEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn open_fetches_history_and_retracts_busy_state() {
    let directory = HistoryDirectory::ready("Where two rivers meet.");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);

    assert_eq!(controller.history(), HistoryState::Loading);
    eventually(|| controller.history() != HistoryState::Loading).await;

    assert_eq!(
        controller.history(),
        HistoryState::Loaded("Where two rivers meet.".to_string())
    );
    assert_eq!(
        drain(&mut rx),
        vec![DetailEvent::HistoryLoading, DetailEvent::HistoryResolved]
    );
}

#[tokio::test]
async fn speech_init_sets_locale_on_ready() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (_controller, _rx) = open(&directory, &speech, &navigator);

    eventually(|| speech.locale.lock().expect("locale").is_some()).await;
    assert_eq!(
        speech.locale.lock().expect("locale").as_deref(),
        Some(SPEECH_LOCALE)
    );
}

#[tokio::test]
async fn play_before_history_resolves_never_starts_speech() {
    let directory = HistoryDirectory::gated("late text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);
    tokio::task::yield_now().await;

    controller.play_history();

    assert!(speech.spoken().is_empty());
    assert!(drain(&mut rx).contains(&DetailEvent::HistoryNotLoaded));
}

#[tokio::test]
async fn play_after_resolution_speaks_exactly_the_loaded_text() {
    let directory = HistoryDirectory::ready("Where two rivers meet.");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);

    eventually(|| controller.history() != HistoryState::Loading).await;
    controller.play_history();

    assert_eq!(
        speech.spoken(),
        vec![("Where two rivers meet.".to_string(), true)]
    );
    assert!(drain(&mut rx).contains(&DetailEvent::SpeechStarted));
}

#[tokio::test]
async fn empty_history_from_server_counts_as_not_loaded() {
    let directory = HistoryDirectory::ready("");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);

    eventually(|| controller.history() != HistoryState::Loading).await;
    assert_eq!(controller.history(), HistoryState::Loaded(String::new()));

    controller.play_history();
    assert!(speech.spoken().is_empty());
    assert!(drain(&mut rx).contains(&DetailEvent::HistoryNotLoaded));
}

#[tokio::test]
async fn failed_fetch_shows_sentinel_which_is_then_speakable() {
    let directory = HistoryDirectory::failing();
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);

    eventually(|| controller.history() != HistoryState::Loading).await;
    assert_eq!(
        controller.history(),
        HistoryState::Failed(HISTORY_FAILURE_TEXT.to_string())
    );
    // Busy indicator is retracted on failure too.
    assert!(drain(&mut rx).contains(&DetailEvent::HistoryResolved));

    // The sentinel is on screen, so the play button reads it out.
    controller.play_history();
    assert_eq!(
        speech.spoken(),
        vec![(HISTORY_FAILURE_TEXT.to_string(), true)]
    );
}

#[tokio::test]
async fn stop_is_a_noop_unless_speaking() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);
    eventually(|| controller.history() != HistoryState::Loading).await;
    drain(&mut rx);

    controller.stop_history();
    assert_eq!(speech.stops.load(Ordering::SeqCst), 0);
    assert!(drain(&mut rx).is_empty());

    controller.play_history();
    controller.stop_history();
    assert_eq!(speech.stops.load(Ordering::SeqCst), 1);
    assert!(drain(&mut rx).contains(&DetailEvent::SpeechStopped));
}

#[tokio::test]
async fn speech_init_failure_degrades_silently() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(false);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);

    eventually(|| controller.history() != HistoryState::Loading).await;
    assert!(speech.locale.lock().expect("locale").is_none());

    // The guard still only reports missing text, never the missing engine.
    controller.play_history();
    let events = drain(&mut rx);
    assert!(events.contains(&DetailEvent::SpeechStarted));
    assert!(!events.contains(&DetailEvent::HistoryNotLoaded));
}

#[tokio::test]
async fn navigate_hands_off_a_driving_directions_deep_link() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, _rx) = open(&directory, &speech, &navigator);

    controller.navigate();

    assert_eq!(
        *navigator.launches.lock().expect("launches"),
        vec![(
            "https://www.google.com/maps/dir/?api=1&destination=25.452,81.839&travelmode=driving"
                .to_string(),
            NAVIGATION_HANDLER_APP.to_string()
        )]
    );
}

#[tokio::test]
async fn navigate_swallows_handler_resolution_failure() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(true);
    let (controller, _rx) = open(&directory, &speech, &navigator);

    controller.navigate();
    assert_eq!(navigator.launches.lock().expect("launches").len(), 1);
}

#[tokio::test]
async fn close_stops_playback_and_releases_the_engine() {
    let directory = HistoryDirectory::ready("text");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, _rx) = open(&directory, &speech, &navigator);

    eventually(|| controller.history() != HistoryState::Loading).await;
    controller.play_history();
    assert!(speech.is_speaking());

    controller.close();

    assert_eq!(speech.stops.load(Ordering::SeqCst), 1);
    assert_eq!(speech.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_discards_a_late_history_result() {
    let directory = HistoryDirectory::gated("too late");
    let speech = TestSpeech::new(true);
    let navigator = TestNavigator::new(false);
    let (controller, mut rx) = open(&directory, &speech, &navigator);
    tokio::task::yield_now().await;
    drain(&mut rx);

    controller.close();
    directory.gate.add_permits(1);
    eventually(|| directory.completed.load(Ordering::SeqCst) == 1).await;

    // The fetch completed but the screen is gone; its result is dropped.
    assert_eq!(controller.history(), HistoryState::Loading);
    assert!(!drain(&mut rx).contains(&DetailEvent::HistoryResolved));
}

#[test]
fn driving_directions_uri_has_the_documented_shape() {
    let uri = driving_directions_uri(Coordinate {
        latitude: 25.452,
        longitude: 81.839,
    })
    .expect("uri");
    assert_eq!(
        uri.as_str(),
        "https://www.google.com/maps/dir/?api=1&destination=25.452,81.839&travelmode=driving"
    );
}

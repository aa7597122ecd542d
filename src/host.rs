// Host side of the rate selector: lifecycle signals from the player chrome,
// the subscription bus that delivers them, and the container abstraction the
// selector binds to.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc::UnboundedSender;

use crate::rate::MediaSink;

/// Lifecycle signals the player emits to its control-bar plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// A different media item is now active.
    ContainerChanged,
    /// The control bar was (re)built for the active container.
    ControlsRendered,
    /// The control bar was hidden.
    ControlsHidden,
}

struct Listener {
    id: u64,
    event: HostEvent,
    tx: UnboundedSender<HostEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out of [`HostEvent`]s to subscribed channels. Cloning shares the
/// same listener set.
#[derive(Clone, Default)]
pub struct HostEvents {
    registry: Arc<Mutex<Registry>>,
}

impl HostEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver every future `event` to `tx` until the returned handle drops.
    pub fn listen_to(&self, event: HostEvent, tx: UnboundedSender<HostEvent>) -> Subscription {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener { id, event, tx });
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Send `event` to its listeners, dropping any whose receiver is gone.
    /// Returns how many listeners received it.
    pub fn emit(&self, event: HostEvent) -> usize {
        let mut registry = lock(&self.registry);
        let mut delivered = 0;
        registry.listeners.retain(|listener| {
            if listener.event != event {
                return true;
            }
            let alive = listener.tx.send(event).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });
        tracing::trace!(?event, delivered, "host event");
        delivered
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Handle for one registration on [`HostEvents`]; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|l| l.id != self.id);
        }
    }
}

/// Kind of media element a container plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MediaKind {
    Video,
    Audio,
}

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "mov", "avi", "m4v", "mpg", "mpeg", "ts", "wmv", "flv", "ogv",
];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "opus", "m4a", "aac", "wav", "wma", "aiff", "alac", "mka",
];

impl MediaKind {
    pub const fn tag_name(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Guess the kind from a path or URL. Streams with no recognizable
    /// extension are treated as audio.
    pub fn detect(location: &str) -> Option<Self> {
        let is_url = location.starts_with("http://") || location.starts_with("https://");
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location);
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => Some(MediaKind::Video),
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext) => Some(MediaKind::Audio),
            _ if is_url => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

/// The active playback target as the rate selector sees it.
pub trait Container {
    /// `"video"` or `"audio"` for media elements; anything else is not
    /// eligible for a rate control.
    fn tag_name(&self) -> &str;

    /// Sink that applies playback rates to this container's media.
    fn media_sink(&self) -> Box<dyn MediaSink + Send>;
}

pub fn is_eligible(container: &dyn Container) -> bool {
    matches!(container.tag_name(), "video" | "audio")
}

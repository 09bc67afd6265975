//! Live-update channel for the dashboard.
//!
//! Two sources feed one [`EventHub`]: a recursive file watcher on the data directory
//! (`refresh`) and the API's own mutations (`update`). Browsers subscribe via
//! `GET /api/events`. Slow or disconnected subscribers simply miss events.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use super::AppState;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A document under the data directory changed on disk.
    Refresh { file: String },
    /// An entity was modified through the HTTP API.
    Update { kind: &'static str, id: String },
}

impl DashboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh { .. } => "refresh",
            Self::Update { .. } => "update",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::Refresh { file } => serde_json::json!({ "file": file }),
            Self::Update { kind, id } => serde_json::json!({ "type": kind, "id": id }),
        }
    }

    fn to_sse(&self) -> Event {
        Event::default()
            .event(self.name())
            .data(self.payload().to_string())
    }
}

/// Fan-out point for dashboard events. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<DashboardEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send to every current subscriber. Having none is not an error.
    pub fn publish(&self, event: DashboardEvent) {
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        tracing::debug!(event = event.name(), receivers, "dashboard event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Open `/api/events` streams.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// `GET /api/events`: a `connected` event, then every published event, with periodic
/// keep-alive comments.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();
    tracing::debug!(
        subscribers = state.events.subscriber_count(),
        "dashboard client connected"
    );
    let updates = BroadcastStream::new(rx)
        .filter_map(|msg| msg.ok().map(|event| Ok(event.to_sse())));
    let connected = tokio_stream::once(Ok(Event::default().event("connected").data("{}")));

    Sse::new(connected.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(state.keepalive)
            .text("ping"),
    )
}

/// Watch `root` recursively and publish a `refresh` event after each burst of changes
/// settles for `debounce`. The returned watcher must be kept alive for events to flow.
pub fn watch_data_dir(
    root: &Path,
    hub: EventHub,
    debounce: Duration,
) -> notify::Result<RecommendedWatcher> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let (fs_tx, mut fs_rx) = mpsc::channel::<PathBuf>(CHANNEL_CAPACITY);

    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<notify::Event>| {
            let Ok(event) = result else {
                return;
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            for path in event.paths {
                let _ = fs_tx.try_send(path);
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::info!(root = %root.display(), "file watcher enabled for live reload");

    tokio::spawn(async move {
        while let Some(mut changed) = fs_rx.recv().await {
            tokio::time::sleep(debounce).await;
            while let Ok(path) = fs_rx.try_recv() {
                changed = path;
            }

            let file = changed
                .strip_prefix(&root)
                .unwrap_or(&changed)
                .to_string_lossy()
                .into_owned();
            tracing::debug!(file = %file, "file change detected");
            hub.publish(DashboardEvent::Refresh { file });
        }
        tracing::debug!("file watcher stopped");
    });

    Ok(watcher)
}

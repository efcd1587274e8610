//! Best-effort usage telemetry.
//!
//! Events go into a bounded queue drained by one background thread.
//! `track` never blocks: a full or closed queue drops the event and counts it.
//! Delivery failures are logged at debug and otherwise ignored.
//! Shutdown waits at most `SHUTDOWN_GRACE` for the backlog; whatever is left
//! after that is discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 64;
pub const GA4_ENDPOINT: &str = "https://www.google-analytics.com/mp/collect";
const SEND_TIMEOUT: Duration = Duration::from_secs(2);
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const JOIN_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry request failed: {0}")]
    Request(String),

    #[error("telemetry endpoint returned HTTP {0}")]
    Status(u16),

    #[error("failed to start telemetry thread: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub params: Map<String, Value>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn page_view(title: &str, location: &str) -> Self {
        Event::new("page_view")
            .param("page_title", title)
            .param("page_location", location)
    }
}

/// Destination for drained events. Owned by the drain thread.
pub trait EventSink: Send + 'static {
    fn deliver(&mut self, event: &Event) -> Result<(), TelemetryError>;
}

/// Discards everything. Used when analytics credentials are absent.
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn deliver(&mut self, _event: &Event) -> Result<(), TelemetryError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct Ga4Payload<'a> {
    client_id: &'a str,
    events: [Ga4Event<'a>; 1],
}

#[derive(Serialize)]
struct Ga4Event<'a> {
    name: &'a str,
    params: Map<String, Value>,
}

/// GA4 Measurement Protocol sink.
pub struct Ga4Sink {
    client: reqwest::blocking::Client,
    endpoint: String,
    measurement_id: String,
    api_secret: String,
    client_id: String,
    session_id: String,
    last_event: Instant,
}

impl Ga4Sink {
    pub fn new(
        measurement_id: impl Into<String>,
        api_secret: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, TelemetryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| TelemetryError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: GA4_ENDPOINT.to_string(),
            measurement_id: measurement_id.into(),
            api_secret: api_secret.into(),
            client_id: client_id.into(),
            session_id: Uuid::new_v4().to_string(),
            last_event: Instant::now(),
        })
    }

    /// Point the sink somewhere other than Google, e.g. a mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl EventSink for Ga4Sink {
    fn deliver(&mut self, event: &Event) -> Result<(), TelemetryError> {
        let now = Instant::now();
        let engagement_ms = now.duration_since(self.last_event).as_millis().max(1) as u64;
        self.last_event = now;

        let mut params = event.params.clone();
        params.insert("session_id".into(), Value::from(self.session_id.as_str()));
        params.insert("engagement_time_msec".into(), Value::from(engagement_ms));

        let payload = Ga4Payload {
            client_id: &self.client_id,
            events: [Ga4Event {
                name: &event.name,
                params,
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("measurement_id", self.measurement_id.as_str()),
                ("api_secret", self.api_secret.as_str()),
            ])
            .json(&payload)
            .send()
            .map_err(|e| TelemetryError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Final counts reported by `TelemetryQueue::shutdown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryStats {
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    abandoned: AtomicBool,
}

/// Bounded fire-and-forget event queue.
pub struct TelemetryQueue {
    tx: Option<SyncSender<Event>>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl TelemetryQueue {
    /// Spawn the drain thread (`vmr-telemetry`) feeding `sink`.
    pub fn start(sink: Box<dyn EventSink>, capacity: usize) -> Result<Self, TelemetryError> {
        let (tx, rx) = sync_channel(capacity);
        let counters = Arc::new(Counters::default());
        let thread_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("vmr-telemetry".into())
            .spawn(move || drain(rx, sink, &thread_counters))
            .map_err(|e| TelemetryError::Spawn(e.to_string()))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            counters,
        })
    }

    /// A queue that accepts nothing and runs no thread.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            handle: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Enqueue without blocking. Returns whether the event was accepted.
    pub fn track(&self, event: Event) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(event = %event.name, "telemetry queue full, event dropped");
                false
            }
        }
    }

    pub fn track_page_view(&self, title: &str, location: &str) -> bool {
        self.track(Event::page_view(title, location))
    }

    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Close the queue, drain it for up to `SHUTDOWN_GRACE`, and report totals.
    pub fn shutdown(self) -> TelemetryStats {
        self.shutdown_within(SHUTDOWN_GRACE)
    }

    /// Like `shutdown` with an explicit grace period. Events still queued
    /// when it runs out are discarded by the detached drain thread.
    pub fn shutdown_within(mut self, grace: Duration) -> TelemetryStats {
        self.close(grace);
        TelemetryStats {
            delivered: self.delivered(),
            failed: self.failed(),
            dropped: self.dropped(),
        }
    }

    fn close(&mut self, grace: Duration) {
        self.tx.take();
        let Some(handle) = self.handle.take() else {
            return;
        };
        let deadline = Instant::now() + grace;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(JOIN_POLL);
        }
        if !handle.is_finished() {
            self.counters.abandoned.store(true, Ordering::Relaxed);
            tracing::debug!(grace_ms = grace.as_millis() as u64, "telemetry drain abandoned");
            return;
        }
        if handle.join().is_err() {
            tracing::debug!("telemetry thread panicked");
        }
    }
}

impl Drop for TelemetryQueue {
    fn drop(&mut self) {
        self.close(Duration::ZERO);
    }
}

fn drain(rx: Receiver<Event>, mut sink: Box<dyn EventSink>, counters: &Counters) {
    for event in rx {
        if counters.abandoned.load(Ordering::Relaxed) {
            counters.dropped.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        match sink.deliver(&event) {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(event = %event.name, error = %e, "telemetry delivery failed");
            }
        }
    }
}

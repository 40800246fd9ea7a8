//! Event stream connection and per-event dispatch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LiveConfig;
use crate::events::{decode_event, Decoded};
use crate::live::activity::ActivityRowRenderer;
use crate::live::context::{PageContext, PageContextResolver};
use crate::live::refresh::DebouncedRefresher;
use crate::live::status::StatusIndicator;
use crate::sse::{sse_messages, SseMessage, DEFAULT_EVENT_TYPE};
use crate::traits::{Dom, Headers, HttpClient, HttpError};

/// Connection state of the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// Only an open stream shows as connected.
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

/// What a message led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Payload did not decode; nothing happened
    Dropped,
    /// Activity page: row inserted (if the table exists) and refresh scheduled
    RowAndRefresh { row_inserted: bool },
    /// Refresh scheduled
    Refresh,
    /// Story page showing a different story
    Ignored,
}

/// How the connection recovers from an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Transport retries by itself after this interval
    Retry(Duration),
    /// Connection is closed; a single reconnect runs after this delay
    Reconnect(Duration),
    /// The manager was stopped; nothing will retry
    Stopped,
}

struct Inner {
    config: LiveConfig,
    http: Arc<dyn HttpClient>,
    indicator: StatusIndicator,
    resolver: PageContextResolver,
    rows: ActivityRowRenderer,
    refresher: DebouncedRefresher,
    state_tx: watch::Sender<ConnectionState>,
    /// Transport retry interval in milliseconds, updated by `retry:` lines
    retry_ms: AtomicU64,
    /// Set by `stop`, cleared by an explicit `connect`. Checked under the
    /// task slot locks so no task is spawned once a stop has begun.
    stopped: AtomicBool,
    connection: Mutex<Option<JoinHandle<()>>>,
    reconnect: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(?previous, ?state, "connection state changed");
        }
    }

    fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms.load(Ordering::SeqCst))
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Replace the connection task, unless stopped.
    fn open_connection(self: &Arc<Self>) {
        let mut connection = lock(&self.connection);
        if self.is_stopped() {
            return;
        }
        if let Some(previous) = connection.take() {
            previous.abort();
        }
        self.set_state(ConnectionState::Connecting);
        let inner = Arc::clone(self);
        *connection = Some(tokio::spawn(inner.run()));
    }

    async fn run(self: Arc<Self>) {
        let url = self.config.stream_url();
        loop {
            let failure = match self.http.get_stream(&url, &Headers::new()).await {
                Ok(body) => {
                    if !self.handle_open() {
                        return;
                    }
                    let mut messages = Box::pin(sse_messages(body));
                    let mut failure = None;
                    while let Some(item) = messages.next().await {
                        match item {
                            Ok(SseMessage::Retry(retry)) => {
                                self.retry_ms
                                    .store(retry.as_millis() as u64, Ordering::SeqCst);
                            }
                            Ok(SseMessage::Event(frame)) if frame.event_type == DEFAULT_EVENT_TYPE => {
                                self.handle_message(&frame.data);
                            }
                            Ok(SseMessage::Event(frame)) => {
                                debug!(event_type = %frame.event_type, "ignoring named event");
                            }
                            Err(e) => {
                                failure = Some(e);
                                break;
                            }
                        }
                    }
                    failure.unwrap_or_else(|| {
                        HttpError::ConnectionFailed("event stream ended".to_string())
                    })
                }
                Err(e) => e,
            };

            match self.handle_error(&failure) {
                Recovery::Retry(delay) => tokio::time::sleep(delay).await,
                Recovery::Reconnect(_) | Recovery::Stopped => return,
            }
        }
    }

    /// Returns `false` if the manager was stopped meanwhile.
    fn handle_open(&self) -> bool {
        if let Some(timer) = lock(&self.reconnect).take() {
            timer.abort();
        }
        if self.is_stopped() {
            return false;
        }
        info!(url = %self.config.stream_url(), "event stream connected");
        self.set_state(ConnectionState::Open);
        self.indicator.set_connected(true);
        true
    }

    fn handle_error(self: &Arc<Self>, err: &HttpError) -> Recovery {
        if self.is_stopped() {
            debug!(error = %err, "error after stop ignored");
            return Recovery::Stopped;
        }
        self.indicator.set_connected(false);
        if err.is_terminal() {
            warn!(error = %err, "event stream closed");
            self.set_state(ConnectionState::Closed);
            self.schedule_reconnect();
            Recovery::Reconnect(self.config.reconnect_delay)
        } else {
            let retry = self.retry();
            info!(error = %err, retry_ms = retry.as_millis() as u64, "event stream interrupted");
            self.set_state(ConnectionState::Connecting);
            Recovery::Retry(retry)
        }
    }

    /// Schedule the manual reconnect unless one is already waiting.
    fn schedule_reconnect(self: &Arc<Self>) {
        let mut reconnect = lock(&self.reconnect);
        if self.is_stopped() || reconnect.as_ref().is_some_and(|timer| !timer.is_finished()) {
            return;
        }
        let inner = Arc::clone(self);
        let delay = self.config.reconnect_delay;
        *reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Release the slot first so the new attempt can schedule again
            drop(lock(&inner.reconnect).take());
            info!("reconnecting to event stream");
            inner.open_connection();
        }));
    }

    fn handle_message(&self, data: &str) -> Dispatch {
        let event = match decode_event(data) {
            Decoded::Event(event) => event,
            Decoded::Invalid(reason) => {
                debug!(%reason, "dropping undecodable event");
                return Dispatch::Dropped;
            }
        };

        self.indicator.flash();

        let dispatch = match self.resolver.resolve() {
            PageContext::Activity => {
                let row_inserted = self.rows.insert(&event);
                self.refresher.request_refresh();
                Dispatch::RowAndRefresh { row_inserted }
            }
            PageContext::Story { story_id } => {
                if event.concerns_story(&story_id) {
                    self.refresher.request_refresh();
                    Dispatch::Refresh
                } else {
                    Dispatch::Ignored
                }
            }
            PageContext::List => {
                self.refresher.request_refresh();
                Dispatch::Refresh
            }
        };
        debug!(?dispatch, action = ?event.action, "event dispatched");
        dispatch
    }

    fn stop(&self) {
        // Raised before taking the slots, so a task racing this call either
        // sees the flag or has its handle taken and aborted below
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(connection) = lock(&self.connection).take() {
            connection.abort();
        }
        if let Some(timer) = lock(&self.reconnect).take() {
            timer.abort();
        }
        self.refresher.cancel();
        self.set_state(ConnectionState::Closed);
        self.indicator.set_connected(false);
    }
}

/// Keeps one event-stream connection alive and applies its events to the
/// document.
///
/// Each instance owns its connection task, reconnect timer and debounce
/// timer; dropping it stops all three.
///
/// # Example
///
/// ```ignore
/// let manager = ConnectionManager::new(config, Arc::new(ReqwestHttpClient::new()), dom);
/// manager.start();
/// let mut state = manager.state_receiver();
/// while state.changed().await.is_ok() {
///     println!("{:?}", *state.borrow());
/// }
/// ```
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(config: LiveConfig, http: Arc<dyn HttpClient>, dom: Arc<dyn Dom>) -> Self {
        let selectors = &config.selectors;
        let indicator = StatusIndicator::new(
            dom.clone(),
            selectors.status_dot.clone(),
            selectors.status_label.clone(),
        );
        let resolver = PageContextResolver::new(
            dom.clone(),
            selectors.story_meta.clone(),
            config.activity_path.clone(),
        );
        let rows = ActivityRowRenderer::new(
            dom.clone(),
            selectors.activity_body.clone(),
            config.max_activity_rows,
        );
        let refresher = DebouncedRefresher::new(
            dom,
            http.clone(),
            selectors.main_content.clone(),
            config.debounce,
        );
        let (state_tx, _) = watch::channel(ConnectionState::Closed);
        let retry_ms = AtomicU64::new(config.default_retry.as_millis() as u64);

        Self {
            inner: Arc::new(Inner {
                config,
                http,
                indicator,
                resolver,
                rows,
                refresher,
                state_tx,
                retry_ms,
                stopped: AtomicBool::new(false),
                connection: Mutex::new(None),
                reconnect: Mutex::new(None),
            }),
        }
    }

    /// Start the connection. Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.connect();
    }

    /// Open a new connection, closing the current one first. Also undoes a
    /// previous [`stop`](Self::stop).
    pub fn connect(&self) {
        self.inner.stopped.store(false, Ordering::SeqCst);
        self.inner.open_connection();
    }

    /// Close the connection and cancel all pending timers. Errors reported
    /// afterwards schedule nothing.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Handle one message body as if it arrived on the stream.
    pub fn handle_message(&self, data: &str) -> Dispatch {
        self.inner.handle_message(data)
    }

    /// Report a connection error as if the transport raised it.
    pub fn handle_error(&self, err: &HttpError) -> Recovery {
        self.inner.handle_error(err)
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribe to connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Whether a manual reconnect is waiting to run.
    pub fn reconnect_pending(&self) -> bool {
        lock(&self.inner.reconnect)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Current transport retry interval.
    pub fn retry_interval(&self) -> Duration {
        self.inner.retry()
    }

    pub fn refresher(&self) -> &DebouncedRefresher {
        &self.inner.refresher
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

//! Debounced main-region refresh.
//!
//! Bursts of refresh requests collapse into one re-fetch of the current page,
//! fired after a quiet period. Only the main region is swapped; chrome,
//! status indicator and everything outside main stay untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::live::typing::TypingGuard;
use crate::page::{extract_region, PageError};
use crate::traits::{Dom, Headers, HttpClient, HttpError};

/// Why a firing did not update the page.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] HttpError),

    #[error("page returned status {0}")]
    Status(u16),

    #[error("page body is not UTF-8")]
    Encoding,

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("document has no element matching '{0}'")]
    TargetMissing(String),
}

/// What one firing did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Main region replaced with the response of firing `generation`
    Applied { generation: u64 },
    /// The operator was typing; nothing fetched
    SkippedTyping,
    /// A younger firing's response was already applied
    Stale { generation: u64 },
    Failed(RefreshError),
}

struct Shared {
    dom: Arc<dyn Dom>,
    http: Arc<dyn HttpClient>,
    guard: TypingGuard,
    main_selector: String,
    /// Generation of the most recent firing
    issued: AtomicU64,
    /// Generation whose response is currently shown
    applied: AtomicU64,
    /// Requests that actually reached the network
    fetches: AtomicU64,
}

impl Shared {
    async fn fire(&self) -> RefreshOutcome {
        if self.guard.is_typing() {
            return RefreshOutcome::SkippedTyping;
        }
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let fresh = match self.fetch_region().await {
            Ok(fresh) => fresh,
            Err(e) => return RefreshOutcome::Failed(e),
        };

        // Older responses that resolve late must not overwrite newer ones
        if self.applied.fetch_max(generation, Ordering::SeqCst) > generation {
            return RefreshOutcome::Stale { generation };
        }

        if !self.dom.set_inner_html(&self.main_selector, &fresh) {
            return RefreshOutcome::Failed(RefreshError::TargetMissing(
                self.main_selector.clone(),
            ));
        }
        RefreshOutcome::Applied { generation }
    }

    async fn fetch_region(&self) -> Result<String, RefreshError> {
        let url = self.dom.location_href();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = self.http.get(&url, &Headers::new()).await?;
        if !response.is_success() {
            return Err(RefreshError::Status(response.status));
        }
        let html = response.text().map_err(|_| RefreshError::Encoding)?;
        Ok(extract_region(&html, &self.main_selector)?)
    }
}

/// Trailing-edge debounce around a main-region refresh.
///
/// At most one timer is pending at any time. Fetches started by a firing
/// run on their own task and are never cancelled.
pub struct DebouncedRefresher {
    shared: Arc<Shared>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedRefresher {
    pub fn new(
        dom: Arc<dyn Dom>,
        http: Arc<dyn HttpClient>,
        main_selector: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                guard: TypingGuard::new(dom.clone()),
                dom,
                http,
                main_selector: main_selector.into(),
                issued: AtomicU64::new(0),
                applied: AtomicU64::new(0),
                fetches: AtomicU64::new(0),
            }),
            delay,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Schedule a refresh after the quiet period, replacing any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_refresh(&self) {
        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        let mut pending = self.pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later request cannot cancel the fetch
            tokio::spawn(async move {
                match shared.fire().await {
                    RefreshOutcome::Applied { generation } => {
                        info!(generation, "main content refreshed")
                    }
                    RefreshOutcome::SkippedTyping => debug!("refresh skipped: user is typing"),
                    RefreshOutcome::Stale { generation } => {
                        debug!(generation, "discarded stale refresh response")
                    }
                    RefreshOutcome::Failed(e) => debug!(error = %e, "refresh failed"),
                }
            });
        }));
    }

    /// Run one firing immediately, bypassing the timer.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.shared.fire().await
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
    }

    /// Whether a timer is waiting to fire.
    pub fn has_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of page fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.shared.fetches.load(Ordering::SeqCst)
    }
}

impl Drop for DebouncedRefresher {
    fn drop(&mut self) {
        self.cancel();
    }
}

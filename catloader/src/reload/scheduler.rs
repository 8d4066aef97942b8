//! Debounced, cancellable reloads for one viewer session.
//!
//! Interactive state changes (paging, sorting, filtering, searching) arrive in
//! bursts. Each [`ReloadScheduler::schedule`] call replaces the pending timer,
//! so only the last request of a burst is loaded once the quiet period
//! elapses.
//!
//! ```text
//!  schedule ──► Scheduled ──(debounce)──► Loading ──► Idle
//!      ▲            │                        │
//!      └── replaces timer,     cancels previous load, bumps generation
//!          supersedes running load
//! ```
//!
//! Every load carries the generation it was started with. Scheduling a newer
//! load cancels the running one and advances the generation, so a load that
//! settles afterwards (even inside the debounce window) is discarded.

use super::config::ReloadConfig;
use super::notify::{NotificationKind, Notifier};
use crate::query::PageRequest;
use crate::remote::FetchError;
use crate::service::CatalogView;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Produces a view for a dataset page.
///
/// [`CatalogService`](crate::service::CatalogService) is the shipped
/// implementation.
pub trait ViewLoader: Send + Sync + 'static {
    fn load_view(
        &self,
        id: &str,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<CatalogView, FetchError>> + Send;
}

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    Idle,
    /// A timer is pending
    Scheduled,
    /// A load is running
    Loading,
}

/// Latest published view, `None` until the first load succeeds.
pub type ViewUpdate = Option<Arc<CatalogView>>;

#[derive(Default)]
struct Session {
    pending: Option<JoinHandle<()>>,
    /// Identifies the pending timer; a timer that lost the race to be
    /// aborted sees a newer value and does not fire.
    timer_seq: u64,
    active: Option<CancellationToken>,
    generation: u64,
    loading: bool,
}

impl Session {
    /// Cancels the running load, if any, and makes its result stale.
    fn supersede_active(&mut self) {
        if let Some(previous) = self.active.take() {
            debug!(generation = self.generation, "Cancelling superseded load");
            previous.cancel();
            self.generation += 1;
            self.loading = false;
        }
    }
}

struct Shared<L, N> {
    loader: L,
    notifier: N,
    config: ReloadConfig,
    session: Mutex<Session>,
    views: watch::Sender<ViewUpdate>,
    shutdown: CancellationToken,
}

/// Debounced reload scheduler for one viewer session.
///
/// Dropping the scheduler shuts it down.
///
/// # Example
///
/// ```ignore
/// use catloader::reload::{ReloadConfig, ReloadScheduler, TracingNotifier};
///
/// let scheduler = ReloadScheduler::new(service, TracingNotifier, ReloadConfig::default());
/// let mut views = scheduler.subscribe();
///
/// scheduler.schedule("gaia.fits", PageRequest::new(2, 100));
/// views.changed().await?;
/// ```
pub struct ReloadScheduler<L, N> {
    shared: Arc<Shared<L, N>>,
}

impl<L: ViewLoader, N: Notifier> ReloadScheduler<L, N> {
    pub fn new(loader: L, notifier: N, config: ReloadConfig) -> Self {
        let (views, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                loader,
                notifier,
                config,
                session: Mutex::new(Session::default()),
                views,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Schedules a reload after the debounce delay, replacing any pending one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, id: impl Into<String>, request: PageRequest) {
        let id = id.into();
        let shared = &self.shared;
        if shared.shutdown.is_cancelled() {
            debug!(dataset = %id, "Reload scheduler shut down, ignoring request");
            return;
        }

        let delay = shared.config.debounce();
        let mut session = shared.session.lock();
        if let Some(timer) = session.pending.take() {
            timer.abort();
        }
        session.timer_seq += 1;
        let seq = session.timer_seq;
        session.supersede_active();

        debug!(
            dataset = %id,
            page = request.page,
            delay_ms = delay.as_millis() as u64,
            "Reload scheduled"
        );

        let timer_shared = Arc::clone(shared);
        session.pending = Some(tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = timer_shared.shutdown.cancelled() => {}

                _ = tokio::time::sleep(delay) => {
                    timer_shared.fire(seq, id, request);
                }
            }
        }));
    }

    /// Starts a load immediately, dropping any pending timer.
    pub fn reload_now(&self, id: impl Into<String>, request: PageRequest) {
        let shared = &self.shared;
        if shared.shutdown.is_cancelled() {
            return;
        }
        let mut session = shared.session.lock();
        if let Some(timer) = session.pending.take() {
            timer.abort();
        }
        session.timer_seq += 1;
        shared.start_load(&mut session, id.into(), request);
    }

    /// Cancels the pending timer and the running load.
    ///
    /// Results still in flight are discarded. Later calls to `schedule` are
    /// ignored.
    pub fn shutdown(&self) {
        let shared = &self.shared;
        if shared.shutdown.is_cancelled() {
            return;
        }
        shared.shutdown.cancel();

        let mut session = shared.session.lock();
        if let Some(timer) = session.pending.take() {
            timer.abort();
        }
        session.timer_seq += 1;
        if let Some(active) = session.active.take() {
            active.cancel();
        }
        session.generation += 1;
        session.loading = false;
        info!("Reload scheduler shut down");
    }

    pub fn state(&self) -> ReloadState {
        let session = self.shared.session.lock();
        if session.pending.is_some() {
            ReloadState::Scheduled
        } else if session.loading {
            ReloadState::Loading
        } else {
            ReloadState::Idle
        }
    }

    /// Current load generation. Advances when a load starts and when a
    /// running load is superseded by a newer request.
    pub fn generation(&self) -> u64 {
        self.shared.session.lock().generation
    }

    /// Receives every view published by a current load.
    pub fn subscribe(&self) -> watch::Receiver<ViewUpdate> {
        self.shared.views.subscribe()
    }

    /// The last published view.
    pub fn current_view(&self) -> ViewUpdate {
        self.shared.views.borrow().clone()
    }
}

impl<L, N> Drop for ReloadScheduler<L, N> {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        let mut session = self.shared.session.lock();
        if let Some(timer) = session.pending.take() {
            timer.abort();
        }
        if let Some(active) = session.active.take() {
            active.cancel();
        }
    }
}

impl<L: ViewLoader, N: Notifier> Shared<L, N> {
    /// Timer expiry. Does nothing if a newer timer replaced this one.
    fn fire(self: &Arc<Self>, seq: u64, id: String, request: PageRequest) {
        let mut session = self.session.lock();
        if session.timer_seq != seq {
            return;
        }
        session.pending = None;
        self.start_load(&mut session, id, request);
    }

    fn start_load(self: &Arc<Self>, session: &mut Session, id: String, request: PageRequest) {
        session.supersede_active();
        let token = self.shutdown.child_token();
        session.generation += 1;
        session.active = Some(token.clone());
        session.loading = true;

        let generation = session.generation;
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            shared.run_load(generation, token, id, request).await;
        });
    }

    async fn run_load(
        &self,
        generation: u64,
        token: CancellationToken,
        id: String,
        request: PageRequest,
    ) {
        debug!(dataset = %id, page = request.page, generation, "Reload started");
        let result = self.loader.load_view(&id, &request, &token).await;

        let error = {
            let mut session = self.session.lock();
            if session.generation != generation {
                debug!(dataset = %id, generation, "Discarding result of superseded load");
                return;
            }
            session.loading = false;
            session.active = None;
            match result {
                Ok(view) => {
                    debug!(
                        dataset = %id,
                        generation,
                        rows = view.page.rows.len(),
                        "Reload published"
                    );
                    self.views.send_replace(Some(Arc::new(view)));
                    None
                }
                Err(e) => Some(e),
            }
        };

        match error {
            None => {}
            Some(e) if e.is_cancelled() => {
                debug!(dataset = %id, generation, "Reload cancelled");
            }
            Some(e) => {
                self.notifier.notify(
                    &format!("Failed to load {}: {}", id, e),
                    self.config.notification_duration(),
                    NotificationKind::Error,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetDescriptor, DatasetId, Record};
    use crate::query::PageResult;
    use crate::reload::ChannelNotifier;
    use crate::service::ViewSource;
    use std::time::Duration;

    /// Loader that records calls and answers with a one-row page naming the
    /// requested page number.
    #[derive(Clone)]
    struct RecordingLoader {
        calls: Arc<Mutex<Vec<(String, PageRequest)>>>,
        delay: Duration,
        slow_page: Option<u32>,
        honor_cancel: bool,
        error: Arc<Mutex<Option<FetchError>>>,
    }

    impl RecordingLoader {
        fn new(delay: Duration) -> Self {
            Self {
                calls: Arc::default(),
                delay,
                slow_page: None,
                honor_cancel: true,
                error: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<(String, PageRequest)> {
            self.calls.lock().clone()
        }
    }

    impl ViewLoader for RecordingLoader {
        async fn load_view(
            &self,
            id: &str,
            request: &PageRequest,
            cancel: &CancellationToken,
        ) -> Result<CatalogView, FetchError> {
            self.calls.lock().push((id.to_string(), request.clone()));
            let delay = if self.slow_page == Some(request.page) {
                Duration::from_millis(500)
            } else {
                self.delay
            };
            tokio::time::sleep(delay).await;

            if self.honor_cancel && cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if let Some(error) = self.error.lock().clone() {
                return Err(error);
            }
            Ok(CatalogView {
                dataset: DatasetId::new(id),
                columns: vec!["page".to_string()],
                descriptor: DatasetDescriptor::default(),
                total_rows: 1,
                page_number: request.page,
                page: PageResult::slice(
                    &[Record::new().with("page", i64::from(request.page))],
                    1,
                    1,
                ),
                source: ViewSource::Remote,
            })
        }
    }

    fn view_page(scheduler: &ReloadScheduler<RecordingLoader, ChannelNotifier>) -> Option<i64> {
        scheduler.current_view().and_then(|v| match v.rows()[0].get("page") {
            Some(crate::dataset::Value::Integer(p)) => Some(*p),
            _ => None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_request() {
        let loader = RecordingLoader::new(Duration::from_millis(100));
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        for page in 1..=5 {
            scheduler.schedule("catalogs/x", PageRequest::new(page, 50));
            assert_eq!(scheduler.state(), ReloadState::Scheduled);
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        assert!(loader.calls().is_empty());

        // 5th schedule at t=160ms fires at t=410ms.
        tokio::time::sleep(Duration::from_millis(260)).await;
        assert_eq!(scheduler.state(), ReloadState::Loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let calls = loader.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.page, 5);
        assert_eq!(view_page(&scheduler), Some(5));
        assert_eq!(scheduler.state(), ReloadState::Idle);
        assert_eq!(scheduler.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_success_is_discarded() {
        let mut loader = RecordingLoader::new(Duration::from_millis(10));
        loader.slow_page = Some(1);
        loader.honor_cancel = false;
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());
        let mut views = scheduler.subscribe();

        // Page 1 fires at 250ms and finishes at 750ms.
        scheduler.schedule("x", PageRequest::new(1, 50));
        tokio::time::sleep(Duration::from_millis(300)).await;
        // Page 2 fires at 550ms and finishes at 560ms.
        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(loader.calls().len(), 2);
        assert_eq!(view_page(&scheduler), Some(2));
        // Only page 2 was ever published.
        assert!(views.has_changed().unwrap());
        views.borrow_and_update();
        assert!(!views.has_changed().unwrap());
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_settling_during_debounce_of_newer_request_is_discarded() {
        let mut loader = RecordingLoader::new(Duration::from_millis(100));
        loader.honor_cancel = false;
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());
        let mut views = scheduler.subscribe();

        // Page 1 fires at 250ms and would publish at 350ms.
        scheduler.schedule("x", PageRequest::new(1, 50));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(scheduler.state(), ReloadState::Loading);

        // Page 2 is still debouncing when page 1 settles.
        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(view_page(&scheduler), None);
        assert!(!views.has_changed().unwrap());
        assert_eq!(scheduler.state(), ReloadState::Scheduled);

        // Page 2 fires at 550ms and publishes at 650ms.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(loader.calls().len(), 2);
        assert_eq!(view_page(&scheduler), Some(2));
        views.borrow_and_update();
        assert!(!views.has_changed().unwrap());
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_of_superseded_load_is_not_notified() {
        let mut loader = RecordingLoader::new(Duration::from_millis(100));
        loader.honor_cancel = false;
        *loader.error.lock() = Some(FetchError::Page {
            status: 500,
            message: "boom".to_string(),
        });
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        scheduler.schedule("x", PageRequest::new(1, 50));
        tokio::time::sleep(Duration::from_millis(300)).await;
        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        // Only the failure of page 2 is reported.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().unwrap().message.contains("boom"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_load_is_cancelled_silently() {
        let mut loader = RecordingLoader::new(Duration::from_millis(10));
        loader.slow_page = Some(1);
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        scheduler.schedule("x", PageRequest::new(1, 50));
        tokio::time::sleep(Duration::from_millis(300)).await;
        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(view_page(&scheduler), Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_notified() {
        let loader = RecordingLoader::new(Duration::from_millis(10));
        *loader.error.lock() = Some(FetchError::Page {
            status: 500,
            message: "boom".to_string(),
        });
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_secs(1)).await;

        let notification = rx.try_recv().unwrap();
        assert!(notification.message.contains("boom"));
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.duration, Duration::from_secs(5));
        assert!(scheduler.current_view().is_none());
        assert_eq!(scheduler.state(), ReloadState::Idle);
        // No retry.
        assert_eq!(loader.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_now_skips_debounce() {
        let loader = RecordingLoader::new(Duration::from_millis(10));
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        scheduler.schedule("x", PageRequest::new(1, 50));
        scheduler.reload_now("x", PageRequest::new(3, 50));
        assert_eq!(scheduler.state(), ReloadState::Loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let calls = loader.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.page, 3);
        assert_eq!(view_page(&scheduler), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_debounce() {
        let loader = RecordingLoader::new(Duration::ZERO);
        let (notifier, _rx) = ChannelNotifier::new();
        let config = ReloadConfig::new().with_debounce(Duration::from_millis(50));
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, config);

        scheduler.schedule("x", PageRequest::new(1, 50));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(loader.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_everything() {
        let loader = RecordingLoader::new(Duration::from_millis(10));
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReloadScheduler::new(loader.clone(), notifier, ReloadConfig::default());

        scheduler.schedule("x", PageRequest::new(1, 50));
        scheduler.shutdown();
        scheduler.schedule("x", PageRequest::new(2, 50));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(loader.calls().is_empty());
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }
}

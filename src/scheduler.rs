use crate::audit::AuditLog;
use crate::dedup::DedupTracker;
use crate::dispatch::Dispatcher;
use crate::enrich::EnrichmentPipeline;
use crate::sources::FetchNews;
use crate::subscribers::SubscriberRegistry;
use crate::types::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Run/stop state plus the delivery dedup key, owned by the scheduler behind
/// one lock. `task` holds the background cycle task so `start` can check
/// liveness before spawning — the invariant that prevents duplicate
/// notifications.
struct PollState {
    running: bool,
    dedup: DedupTracker,
    task: Option<JoinHandle<()>>,
}

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    NoNews,
    Duplicate,
    Delivered(usize),
}

/// Drives the fetch -> dedup -> enrich -> dispatch -> sleep cycle and owns the
/// two-state (Stopped/Running) machine. `stop` is cooperative: the in-flight
/// cycle finishes and the loop exits at its next top-of-cycle check.
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<PollState>,
    source: Mutex<Box<dyn FetchNews>>,
    pipeline: EnrichmentPipeline,
    dispatcher: Dispatcher,
    subscribers: Arc<SubscriberRegistry>,
    audit: AuditLog,
    interval: Duration,
    spawned: AtomicUsize,
}

impl Scheduler {
    pub fn new(
        source: Box<dyn FetchNews>,
        pipeline: EnrichmentPipeline,
        dispatcher: Dispatcher,
        subscribers: Arc<SubscriberRegistry>,
        audit: AuditLog,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(PollState {
                    running: false,
                    dedup: DedupTracker::new(),
                    task: None,
                }),
                source: Mutex::new(source),
                pipeline,
                dispatcher,
                subscribers,
                audit,
                interval,
                spawned: AtomicUsize::new(0),
            }),
        }
    }

    /// Idempotent start. Spawns the cycle task only when none is alive;
    /// returns whether a new task was spawned.
    pub async fn start(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        state.running = true;

        let alive = state.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false);
        if alive {
            debug!("cycle task already active, not spawning another");
            return false;
        }

        let inner = Arc::clone(&self.inner);
        state.task = Some(tokio::spawn(async move { inner.run_loop().await }));
        self.inner.spawned.fetch_add(1, Ordering::SeqCst);
        info!("news cycle task started (interval {:?})", self.inner.interval);
        true
    }

    /// Sets the flag only; the running cycle finishes its in-flight work and
    /// exits within one interval.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        state.running = false;
        info!("news cycle pause requested");
    }

    pub async fn is_running(&self) -> bool {
        self.inner.state.lock().await.running
    }

    /// Whether a cycle task is currently alive.
    pub async fn has_live_cycle(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// How many cycle tasks have ever been spawned.
    pub fn spawn_count(&self) -> usize {
        self.inner.spawned.load(Ordering::SeqCst)
    }

    /// The identity of the last item delivered by the background cycle.
    pub async fn last_delivered(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .await
            .dedup
            .last_delivered()
            .map(|s| s.to_string())
    }

    /// One poll cycle: fetch, dedup-check, enrich, audit, dispatch, record.
    pub async fn run_once(&self) -> Result<CycleOutcome> {
        self.inner.run_once().await
    }

    /// On-demand fetch for a single requester: fetch -> enrich -> render,
    /// without reading or updating the shared delivery dedup key.
    pub async fn fetch_once(&self) -> Option<String> {
        self.inner.fetch_once().await
    }
}

impl Inner {
    async fn run_loop(&self) {
        loop {
            {
                let state = self.state.lock().await;
                if !state.running {
                    break;
                }
            }
            match self.run_once().await {
                Ok(outcome) => debug!("cycle outcome: {:?}", outcome),
                Err(e) => error!("cycle failed, continuing: {}", e),
            }
            tokio::time::sleep(self.interval).await;
        }
        info!("news cycle task exited");
    }

    /// One poll cycle. Strict order: fetch, dedup-check, enrich, audit,
    /// dispatch, record — the dedup key is only advanced after the fanout ran,
    /// so a fetched-but-undelivered item stays deliverable.
    async fn run_once(&self) -> Result<CycleOutcome> {
        let item = {
            let mut source = self.source.lock().await;
            source.fetch().await
        };
        let Some(item) = item else {
            return Ok(CycleOutcome::NoNews);
        };

        {
            let state = self.state.lock().await;
            if !state.dedup.is_new(&item) {
                debug!("already delivered, skipping: {}", item.title);
                return Ok(CycleOutcome::Duplicate);
            }
        }

        let enriched = self.pipeline.apply(item.clone()).await;
        let message = enriched.render();

        if let Err(e) = self.audit.append(&enriched) {
            error!("audit log write failed: {}", e);
        }

        let subscribers = self.subscribers.all().await;
        info!("delivering \"{}\" to {} chats", enriched.title, subscribers.len());
        let delivered = self.dispatcher.send_to_all(&message, &subscribers).await;

        self.state.lock().await.dedup.record(&item);
        Ok(CycleOutcome::Delivered(delivered))
    }

    async fn fetch_once(&self) -> Option<String> {
        let item = {
            let mut source = self.source.lock().await;
            source.fetch().await
        }?;

        let enriched = self.pipeline.apply(item).await;
        if let Err(e) = self.audit.append(&enriched) {
            error!("audit log write failed: {}", e);
        }
        Some(enriched.render())
    }
}

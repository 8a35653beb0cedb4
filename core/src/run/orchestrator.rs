use crate::error::{CoreError, CoreResult};
use crate::ledger::record::CheckRecord;
use crate::ledger::store::CheckLedger;
use crate::run::state::{valid_transition, CheckOutcome, CheckState};
use crate::scan::gateway::AnalyzerGateway;
use crate::scan::model::ScanResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};
use tracing::{info, warn};

struct Inner {
    state: CheckState,
    last: Option<CheckOutcome>,
    // bumped on every submit; a finishing analysis whose generation is
    // stale must not touch the ledger
    generation: u64,
    // set by `cancel`; the state stays RUNNING until the cancelled submit
    // has dropped its analysis
    cancel_requested: bool,
    cancel: Arc<Notify>,
}

impl Inner {
    fn transition(&mut self, to: CheckState, tx: &watch::Sender<CheckState>) -> bool {
        if !valid_transition(self.state, to) {
            warn!("invalid check state transition {:?} -> {:?}", self.state, to);
            return false;
        }
        self.state = to;
        tx.send_replace(to);
        true
    }
}

/// Single-flight driver for URL submissions: at most one analysis in flight,
/// successful checks appended to the shared ledger, failures leave no trace.
pub struct CheckOrchestrator {
    gateway: AnalyzerGateway,
    ledger: Arc<Mutex<CheckLedger>>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<CheckState>,
}

impl CheckOrchestrator {
    pub fn new(gateway: AnalyzerGateway, ledger: Arc<Mutex<CheckLedger>>) -> Self {
        let (state_tx, _) = watch::channel(CheckState::IDLE);
        Self {
            gateway,
            ledger,
            inner: Mutex::new(Inner {
                state: CheckState::IDLE,
                last: None,
                generation: 0,
                cancel_requested: false,
                cancel: Arc::new(Notify::new()),
            }),
            state_tx,
        }
    }

    pub fn state(&self) -> CheckState {
        lock(&self.inner).state
    }

    pub fn last_outcome(&self) -> Option<CheckOutcome> {
        lock(&self.inner).last.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CheckState> {
        self.state_tx.subscribe()
    }

    /// Starts a check. A previous terminal outcome counts as consumed. While
    /// another check is running this returns `AlreadyRunning` without queuing.
    pub async fn submit(&self, url: &str) -> CoreResult<CheckRecord> {
        let (generation, cancel) = self.begin()?;
        let mut guard = RunningGuard {
            orchestrator: self,
            generation,
            armed: true,
        };

        info!(analyzer = self.gateway.analyzer_name(), "check started for {}", url);
        let analysis = tokio::select! {
            biased;
            _ = cancel.notified() => Err(CoreError::Cancelled),
            r = self.gateway.analyze(url) => r,
        };
        guard.armed = false;
        self.finish(generation, url, analysis)
    }

    /// Asks the running check to stop. The pending `submit` drops its
    /// analysis, returns `Cancelled` and moves the state to IDLE; until then
    /// the orchestrator stays RUNNING and rejects new submissions.
    pub fn cancel(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.state != CheckState::RUNNING || inner.cancel_requested {
            return false;
        }
        inner.cancel_requested = true;
        inner.cancel.notify_one();
        info!("check cancellation requested");
        true
    }

    pub fn reset(&self) -> CoreResult<()> {
        let mut inner = lock(&self.inner);
        match inner.state {
            CheckState::RUNNING => Err(CoreError::AlreadyRunning),
            CheckState::IDLE => Ok(()),
            CheckState::SUCCEEDED | CheckState::FAILED => {
                inner.last = None;
                inner.transition(CheckState::IDLE, &self.state_tx);
                Ok(())
            }
        }
    }

    fn begin(&self) -> CoreResult<(u64, Arc<Notify>)> {
        let mut inner = lock(&self.inner);
        if inner.state == CheckState::RUNNING {
            return Err(CoreError::AlreadyRunning);
        }
        if inner.state.is_terminal() {
            inner.last = None;
            inner.transition(CheckState::IDLE, &self.state_tx);
        }
        inner.generation += 1;
        inner.cancel_requested = false;
        inner.cancel = Arc::new(Notify::new());
        inner.transition(CheckState::RUNNING, &self.state_tx);
        Ok((inner.generation, inner.cancel.clone()))
    }

    fn finish(
        &self,
        generation: u64,
        url: &str,
        analysis: CoreResult<ScanResult>,
    ) -> CoreResult<CheckRecord> {
        let mut inner = lock(&self.inner);
        if inner.generation != generation || inner.state != CheckState::RUNNING {
            info!("discarding result of abandoned check for {}", url);
            return Err(CoreError::Cancelled);
        }
        if inner.cancel_requested {
            inner.cancel_requested = false;
            inner.transition(CheckState::IDLE, &self.state_tx);
            info!("check cancelled for {}", url);
            return Err(CoreError::Cancelled);
        }
        let appended = analysis.and_then(|result| {
            let record = CheckRecord::mint(url.trim(), result);
            lock(&self.ledger).append(record.clone())?;
            Ok(record)
        });
        match appended {
            Ok(record) => {
                info!(
                    check_id = record.id(),
                    total_violations = record.result().total_violations(),
                    "check succeeded for {}",
                    record.url()
                );
                inner.last = Some(CheckOutcome::Succeeded(record.clone()));
                inner.transition(CheckState::SUCCEEDED, &self.state_tx);
                Ok(record)
            }
            Err(CoreError::Cancelled) => {
                inner.transition(CheckState::IDLE, &self.state_tx);
                Err(CoreError::Cancelled)
            }
            Err(e) => {
                warn!("check failed for {}: {}", url, e);
                inner.last = Some(CheckOutcome::Failed(e.kind()));
                inner.transition(CheckState::FAILED, &self.state_tx);
                Err(e)
            }
        }
    }
}

// Returns the orchestrator to IDLE when a submit future is dropped mid-flight.
struct RunningGuard<'a> {
    orchestrator: &'a CheckOrchestrator,
    generation: u64,
    armed: bool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(&self.orchestrator.inner);
        if inner.generation == self.generation && inner.state == CheckState::RUNNING {
            inner.generation += 1;
            inner.cancel_requested = false;
            inner.transition(CheckState::IDLE, &self.orchestrator.state_tx);
            info!("check abandoned by caller");
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

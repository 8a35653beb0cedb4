//! Per-user entry point: submission, history and export over one ledger.

use crate::error::CoreResult;
use crate::export::gate::{Capabilities, ExportFormat};
use crate::export::{ExportedDocument, ReportExporter};
use crate::ledger::record::{CheckRecord, CheckSummary};
use crate::ledger::store::CheckLedger;
use crate::run::orchestrator::CheckOrchestrator;
use crate::run::state::CheckState;
use crate::scan::gateway::AnalyzerGateway;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub struct CheckSession {
    orchestrator: CheckOrchestrator,
    ledger: Arc<Mutex<CheckLedger>>,
    exporter: ReportExporter,
}

impl CheckSession {
    pub fn new(gateway: AnalyzerGateway, capabilities: Capabilities) -> Self {
        Self::with_ledger(gateway, capabilities, CheckLedger::new())
    }

    /// Resumes a session over an existing history (e.g. loaded from disk).
    pub fn with_ledger(
        gateway: AnalyzerGateway,
        capabilities: Capabilities,
        ledger: CheckLedger,
    ) -> Self {
        let ledger = Arc::new(Mutex::new(ledger));
        Self {
            orchestrator: CheckOrchestrator::new(gateway, ledger.clone()),
            ledger,
            exporter: ReportExporter::new(capabilities),
        }
    }

    pub async fn submit_check(&self, url: &str) -> CoreResult<CheckRecord> {
        self.orchestrator.submit(url).await
    }

    pub fn cancel_check(&self) -> bool {
        self.orchestrator.cancel()
    }

    pub fn reset(&self) -> CoreResult<()> {
        self.orchestrator.reset()
    }

    pub fn state(&self) -> CheckState {
        self.orchestrator.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<CheckState> {
        self.orchestrator.subscribe()
    }

    pub fn list_checks(&self) -> Vec<CheckSummary> {
        self.ledger().summaries()
    }

    pub fn get_check(&self, id: &str) -> CoreResult<CheckRecord> {
        self.ledger().get(id).cloned()
    }

    pub fn export_check(&self, id: &str, format: ExportFormat) -> CoreResult<ExportedDocument> {
        let record = self.get_check(id)?;
        self.exporter.export(&record, format)
    }

    pub fn remove_check(&self, id: &str) -> CoreResult<()> {
        self.ledger().remove(id).map(|_| ())
    }

    pub fn clear_checks(&self) {
        self.ledger().clear()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.exporter.capabilities()
    }

    /// Copy of the current history, e.g. for persisting.
    pub fn snapshot(&self) -> CheckLedger {
        self.ledger().clone()
    }

    fn ledger(&self) -> MutexGuard<'_, CheckLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hands out one session per key so that histories never mix.
pub struct SessionRegistry {
    gateway: AnalyzerGateway,
    sessions: Mutex<HashMap<String, Arc<CheckSession>>>,
}

impl SessionRegistry {
    pub fn new(gateway: AnalyzerGateway) -> Self {
        Self {
            gateway,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Capabilities are fixed when the session is first created.
    pub fn session(&self, key: &str, capabilities: Capabilities) -> Arc<CheckSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(CheckSession::new(self.gateway.clone(), capabilities)))
            .clone()
    }

    pub fn end_session(&self, key: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

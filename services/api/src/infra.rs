use finlens::intake::{
    BatchHandler, BatchSummary, CandidateFile, IntakeProfile, StatusObserver, StatusUpdate,
    ValidatedBatch,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

const STATUS_HISTORY_LIMIT: usize = 64;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) batches: Arc<InMemoryBatchStore>,
    pub(crate) history: Arc<InMemoryStatusLog>,
}

/// Keeps the most recently delivered batch for the report pages.
#[derive(Default)]
pub(crate) struct InMemoryBatchStore {
    latest: Mutex<Option<BatchSummary>>,
}

impl BatchHandler for InMemoryBatchStore {
    fn deliver(&self, batch: ValidatedBatch) {
        let summary = BatchSummary::from_batch(&batch);
        let mut guard = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(summary);
    }
}

impl InMemoryBatchStore {
    pub(crate) fn latest_summary(&self) -> Option<BatchSummary> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Bounded history of status transitions, newest last.
#[derive(Default)]
pub(crate) struct InMemoryStatusLog {
    updates: Mutex<VecDeque<StatusUpdate>>,
}

impl StatusObserver for InMemoryStatusLog {
    fn on_status(&self, update: &StatusUpdate) {
        tracing::debug!(
            attempt = %update.attempt,
            status = %update.status,
            "intake status changed"
        );
        let mut guard = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.len() == STATUS_HISTORY_LIMIT {
            guard.pop_front();
        }
        guard.push_back(update.clone());
    }
}

impl InMemoryStatusLog {
    pub(crate) fn recent(&self) -> Vec<StatusUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

pub(crate) fn parse_profile(raw: &str) -> Result<IntakeProfile, String> {
    raw.parse::<IntakeProfile>().map_err(|err| err.to_string())
}

/// Describes a local file the way a browser file picker would.
pub(crate) fn candidate_from_path(path: &Path) -> std::io::Result<CandidateFile> {
    let metadata = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Ok(CandidateFile::new(name, metadata.len(), mime.essence_str()))
}

use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::intake::controller::{BatchHandler, IntakeTimings, StatusObserver};
use crate::intake::domain::{
    CandidateFile, IntakeConfiguration, IntakeStatus, StatusUpdate, ValidatedBatch,
};
use crate::intake::UploadIntakeController;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Event {
    Status(IntakeStatus),
    Batch(Vec<String>),
}

/// Observer and handler in one so tests can assert the interleaving.
#[derive(Default)]
pub(super) struct EventLog {
    events: Mutex<Vec<Event>>,
    updates: Mutex<Vec<StatusUpdate>>,
    batches: Mutex<Vec<ValidatedBatch>>,
}

impl EventLog {
    pub(super) fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event mutex poisoned").clone()
    }

    pub(super) fn statuses(&self) -> Vec<IntakeStatus> {
        self.updates
            .lock()
            .expect("update mutex poisoned")
            .iter()
            .map(|update| update.status)
            .collect()
    }

    pub(super) fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().expect("update mutex poisoned").clone()
    }

    pub(super) fn batches(&self) -> Vec<ValidatedBatch> {
        self.batches.lock().expect("batch mutex poisoned").clone()
    }
}

impl StatusObserver for EventLog {
    fn on_status(&self, update: &StatusUpdate) {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(Event::Status(update.status));
        self.updates
            .lock()
            .expect("update mutex poisoned")
            .push(update.clone());
    }
}

impl BatchHandler for EventLog {
    fn deliver(&self, batch: ValidatedBatch) {
        let names = batch.names().map(str::to_string).collect();
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(Event::Batch(names));
        self.batches
            .lock()
            .expect("batch mutex poisoned")
            .push(batch);
    }
}

pub(super) fn build_controller(
    timings: IntakeTimings,
) -> (UploadIntakeController<EventLog, EventLog>, Arc<EventLog>) {
    let log = Arc::new(EventLog::default());
    let controller = UploadIntakeController::new(log.clone(), log.clone(), timings);
    (controller, log)
}

pub(super) fn spreadsheet_config() -> IntakeConfiguration {
    IntakeConfiguration::new([".xlsx", ".xls", ".csv"], 5).expect("valid configuration")
}

pub(super) fn pdf_config(max_files: usize) -> IntakeConfiguration {
    IntakeConfiguration::new([".pdf"], max_files).expect("valid configuration")
}

pub(super) fn file(name: &str) -> CandidateFile {
    CandidateFile::new(name, 20_480, "application/octet-stream")
}

pub(super) fn files(names: &[&str]) -> Vec<CandidateFile> {
    names.iter().map(|name| file(name)).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

//! Upload intake state machine.
//!
//! `submit` validates synchronously and moves the controller to `Uploading`;
//! the remaining transitions (`Success`/`Error`, then back to `Idle`) run on a
//! spawned tokio task. One submission is in flight at a time: a second
//! `submit` before the status has returned to `Idle` is refused.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::domain::{
    AttemptId, CandidateFile, IntakeConfiguration, IntakeRejection, IntakeStatus, StatusUpdate,
    ValidatedBatch,
};
use super::filter;
use super::summary::BatchSummary;

/// Receives every status transition, in order.
///
/// Called while the controller state is locked, so implementations must not
/// call back into the controller.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, update: &StatusUpdate);
}

/// Downstream consumer of accepted batches.
pub trait BatchHandler: Send + Sync {
    fn deliver(&self, batch: ValidatedBatch);
}

/// Forwards status updates to an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelStatusObserver {
    sender: UnboundedSender<StatusUpdate>,
}

impl ChannelStatusObserver {
    pub fn new(sender: UnboundedSender<StatusUpdate>) -> Self {
        Self { sender }
    }
}

impl StatusObserver for ChannelStatusObserver {
    fn on_status(&self, update: &StatusUpdate) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.sender.send(update.clone());
    }
}

/// Simulated processing latency and how long terminal states stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeTimings {
    pub processing: Duration,
    pub success_reset: Duration,
    pub error_reset: Duration,
}

impl Default for IntakeTimings {
    fn default() -> Self {
        Self {
            processing: Duration::from_millis(1500),
            success_reset: Duration::from_millis(2000),
            error_reset: Duration::from_millis(3000),
        }
    }
}

impl IntakeTimings {
    pub fn immediate() -> Self {
        Self {
            processing: Duration::ZERO,
            success_reset: Duration::ZERO,
            error_reset: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Accepted(BatchSummary),
    Rejected(IntakeRejection),
}

impl IntakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IntakeOutcome::Accepted(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("an upload is already in progress (status: {status})")]
    Busy { status: IntakeStatus },
    #[error("intake submissions require a running tokio runtime")]
    NoRuntime,
    #[error("intake task stopped before finishing: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Handle to an in-flight submission. Dropping it does not cancel anything.
#[derive(Debug)]
pub struct SubmissionHandle {
    attempt: AttemptId,
    rejection: Option<IntakeRejection>,
    task: JoinHandle<IntakeOutcome>,
}

impl SubmissionHandle {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Validation failure, known as soon as `submit` returns.
    pub fn rejection(&self) -> Option<&IntakeRejection> {
        self.rejection.as_ref()
    }

    /// Resolves once the controller is back to `Idle` for this attempt.
    pub async fn wait(self) -> Result<IntakeOutcome, IntakeError> {
        Ok(self.task.await?)
    }
}

struct IntakeState {
    last_attempt: u64,
    current: StatusUpdate,
}

struct Shared<O, H> {
    observer: Arc<O>,
    handler: Arc<H>,
    timings: IntakeTimings,
    state: Mutex<IntakeState>,
}

impl<O, H> Shared<O, H>
where
    O: StatusObserver,
    H: BatchHandler,
{
    fn lock(&self) -> MutexGuard<'_, IntakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `attempt` from `from` to `to`. A no-op when another transition or
    /// a newer attempt got there first.
    fn advance(
        &self,
        attempt: AttemptId,
        from: IntakeStatus,
        to: IntakeStatus,
        message: Option<String>,
    ) -> bool {
        let mut state = self.lock();
        if state.current.attempt != attempt
            || state.current.status != from
            || !from.can_transition_to(to)
        {
            return false;
        }

        state.current = StatusUpdate::new(attempt, to, message);
        self.observer.on_status(&state.current);
        true
    }
}

/// Drives one drop zone: validates offered files and reports status changes.
pub struct UploadIntakeController<O, H> {
    shared: Arc<Shared<O, H>>,
}

impl<O, H> Clone for UploadIntakeController<O, H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<O, H> UploadIntakeController<O, H>
where
    O: StatusObserver + 'static,
    H: BatchHandler + 'static,
{
    pub fn new(observer: Arc<O>, handler: Arc<H>, timings: IntakeTimings) -> Self {
        let state = IntakeState {
            last_attempt: 0,
            current: StatusUpdate::new(AttemptId(0), IntakeStatus::Idle, None),
        };

        Self {
            shared: Arc::new(Shared {
                observer,
                handler,
                timings,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn status(&self) -> StatusUpdate {
        self.shared.lock().current.clone()
    }

    pub fn timings(&self) -> IntakeTimings {
        self.shared.timings
    }

    /// Validates `files` against `config` and schedules the rest of the
    /// status sequence. Returns without waiting on any delay.
    pub fn submit(
        &self,
        files: Vec<CandidateFile>,
        config: &IntakeConfiguration,
    ) -> Result<SubmissionHandle, IntakeError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| IntakeError::NoRuntime)?;
        let offered = files.len();

        let attempt = {
            let mut state = self.shared.lock();
            if state.current.status != IntakeStatus::Idle {
                return Err(IntakeError::Busy {
                    status: state.current.status,
                });
            }

            state.last_attempt += 1;
            let attempt = AttemptId(state.last_attempt);
            state.current = StatusUpdate::new(attempt, IntakeStatus::Uploading, None);
            self.shared.observer.on_status(&state.current);
            attempt
        };

        debug!(%attempt, offered, "intake submission received");

        match filter::validate(attempt, files, config) {
            Ok(batch) => {
                let shared = Arc::clone(&self.shared);
                let task = runtime.spawn(complete_upload(shared, batch));
                Ok(SubmissionHandle {
                    attempt,
                    rejection: None,
                    task,
                })
            }
            Err(rejection) => {
                info!(%attempt, offered, reason = %rejection, "intake submission rejected");
                self.shared.advance(
                    attempt,
                    IntakeStatus::Uploading,
                    IntakeStatus::Error,
                    Some(rejection.to_string()),
                );

                let shared = Arc::clone(&self.shared);
                let outcome = IntakeOutcome::Rejected(rejection.clone());
                let task = runtime.spawn(async move {
                    tokio::time::sleep(shared.timings.error_reset).await;
                    shared.advance(attempt, IntakeStatus::Error, IntakeStatus::Idle, None);
                    outcome
                });

                Ok(SubmissionHandle {
                    attempt,
                    rejection: Some(rejection),
                    task,
                })
            }
        }
    }

    /// Clears a displayed error ahead of its timer. Returns `false` when
    /// there is no error to dismiss.
    pub fn dismiss(&self) -> bool {
        let attempt = self.shared.lock().current.attempt;
        let dismissed = self
            .shared
            .advance(attempt, IntakeStatus::Error, IntakeStatus::Idle, None);
        if dismissed {
            debug!(%attempt, "intake error dismissed");
        }
        dismissed
    }
}

async fn complete_upload<O, H>(shared: Arc<Shared<O, H>>, batch: ValidatedBatch) -> IntakeOutcome
where
    O: StatusObserver,
    H: BatchHandler,
{
    let attempt = batch.attempt();
    tokio::time::sleep(shared.timings.processing).await;

    let summary = BatchSummary::from_batch(&batch);
    shared.handler.deliver(batch);
    info!(%attempt, accepted = summary.file_count, "intake batch accepted");
    shared.advance(attempt, IntakeStatus::Uploading, IntakeStatus::Success, None);

    tokio::time::sleep(shared.timings.success_reset).await;
    shared.advance(attempt, IntakeStatus::Success, IntakeStatus::Idle, None);

    IntakeOutcome::Accepted(summary)
}

//! Document intake for the analysis dashboard: extension and count validation
//! of offered files plus the status sequence shown by the drop zone.

pub mod controller;
pub mod domain;
pub mod filter;
pub mod manifest;
pub mod profiles;
pub mod router;
pub mod summary;

#[cfg(test)]
mod tests;

pub use controller::{
    BatchHandler, ChannelStatusObserver, IntakeError, IntakeOutcome, IntakeTimings,
    StatusObserver, SubmissionHandle, UploadIntakeController,
};
pub use domain::{
    AttemptId, CandidateFile, IntakeConfigError, IntakeConfiguration, IntakeRejection,
    IntakeStatus, StatusUpdate, ValidatedBatch,
};
pub use manifest::{ManifestError, UploadManifest};
pub use profiles::{IntakeProfile, UnknownProfile};
pub use router::{intake_router, SubmissionRequest};
pub use summary::{BatchSummary, FileSummaryView};

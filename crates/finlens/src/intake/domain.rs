use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file offered for upload, described only by the metadata the host supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    #[serde(rename = "type", alias = "mime_or_extension", default)]
    pub mime_or_extension: String,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        mime_or_extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_or_extension: mime_or_extension.into(),
        }
    }
}

/// Acceptance criteria for one submission.
///
/// Extensions are matched as case-insensitive suffixes of the file name, so a
/// leading dot is significant: `.pdf` accepts `report.pdf` but not `reportpdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIntakeConfiguration")]
pub struct IntakeConfiguration {
    accepted_extensions: Vec<String>,
    max_files: usize,
}

#[derive(Deserialize)]
struct RawIntakeConfiguration {
    accepted_extensions: Vec<String>,
    max_files: usize,
}

impl TryFrom<RawIntakeConfiguration> for IntakeConfiguration {
    type Error = IntakeConfigError;

    fn try_from(raw: RawIntakeConfiguration) -> Result<Self, Self::Error> {
        Self::new(raw.accepted_extensions, raw.max_files)
    }
}

impl IntakeConfiguration {
    pub fn new<I, S>(accepted_extensions: I, max_files: usize) -> Result<Self, IntakeConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if max_files == 0 {
            return Err(IntakeConfigError::ZeroMaxFiles);
        }

        let mut normalized: Vec<String> = Vec::new();
        for extension in accepted_extensions {
            let extension = extension.as_ref().trim().to_lowercase();
            if extension.is_empty() {
                return Err(IntakeConfigError::BlankExtension);
            }
            if !normalized.contains(&extension) {
                normalized.push(extension);
            }
        }

        if normalized.is_empty() {
            return Err(IntakeConfigError::NoExtensions);
        }

        Ok(Self {
            accepted_extensions: normalized,
            max_files,
        })
    }

    /// Builds a preset from constants that are already lower-cased and non-empty.
    pub(crate) fn from_static(extensions: &[&str], max_files: usize) -> Self {
        Self {
            accepted_extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            max_files,
        }
    }

    /// Lower-cased accepted suffixes in the order they were configured.
    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Prompt shown next to an idle drop zone.
    pub fn describe(&self) -> String {
        format!(
            "Accepted formats: {} • Max {} files",
            self.accepted_extensions.join(", "),
            self.max_files
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeConfigError {
    #[error("at least one accepted extension is required")]
    NoExtensions,
    #[error("accepted extensions must not be blank")]
    BlankExtension,
    #[error("max_files must be at least 1")]
    ZeroMaxFiles,
}

/// Lifecycle of a single intake attempt as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

impl IntakeStatus {
    pub fn label(self) -> &'static str {
        match self {
            IntakeStatus::Idle => "idle",
            IntakeStatus::Uploading => "uploading",
            IntakeStatus::Success => "success",
            IntakeStatus::Error => "error",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            IntakeStatus::Idle => "Drag and drop files here, or click to browse",
            IntakeStatus::Uploading => "Uploading and validating files...",
            IntakeStatus::Success => "Files uploaded successfully!",
            IntakeStatus::Error => "Upload failed",
        }
    }

    pub fn can_transition_to(self, next: IntakeStatus) -> bool {
        matches!(
            (self, next),
            (IntakeStatus::Idle, IntakeStatus::Uploading)
                | (IntakeStatus::Uploading, IntakeStatus::Success)
                | (IntakeStatus::Uploading, IntakeStatus::Error)
                | (IntakeStatus::Success, IntakeStatus::Idle)
                | (IntakeStatus::Error, IntakeStatus::Idle)
        )
    }
}

impl fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sequence number of a submission. `0` means nothing has been submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intake-{:06}", self.0)
    }
}

/// Emitted to observers on every status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub attempt: AttemptId,
    pub status: IntakeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub(crate) fn new(attempt: AttemptId, status: IntakeStatus, message: Option<String>) -> Self {
        Self {
            attempt,
            status,
            message,
            at: Utc::now(),
        }
    }
}

/// Files that passed extension filtering, in the order they were offered.
///
/// Only produced by validation, so it is never empty and never larger than the
/// configured ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedBatch {
    attempt: AttemptId,
    files: Vec<CandidateFile>,
}

impl ValidatedBatch {
    pub(crate) fn new(attempt: AttemptId, files: Vec<CandidateFile>) -> Self {
        Self { attempt, files }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.name.as_str())
    }

    pub fn into_files(self) -> Vec<CandidateFile> {
        self.files
    }
}

/// Why a submission produced no batch. Both cases are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeRejection {
    #[error("No valid files found. Please check file types.")]
    NoValidFiles,
    #[error("Too many files. Maximum {max_files} files allowed.")]
    TooManyFiles { max_files: usize, offered: usize },
}

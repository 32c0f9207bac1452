use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{AttemptId, CandidateFile, ValidatedBatch};

/// What downstream report builders see of an accepted batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub attempt: AttemptId,
    pub file_count: usize,
    pub total_bytes: u64,
    pub accepted_at: DateTime<Utc>,
    pub files: Vec<FileSummaryView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummaryView {
    pub name: String,
    pub size_mb: String,
    pub kind: &'static str,
}

impl FileSummaryView {
    fn from_candidate(file: &CandidateFile) -> Self {
        Self {
            name: file.name.clone(),
            size_mb: format_megabytes(file.size_bytes),
            kind: kind_label(&file.mime_or_extension),
        }
    }
}

impl BatchSummary {
    pub fn from_batch(batch: &ValidatedBatch) -> Self {
        Self {
            attempt: batch.attempt(),
            file_count: batch.len(),
            total_bytes: batch.files().iter().map(|file| file.size_bytes).sum(),
            accepted_at: Utc::now(),
            files: batch
                .files()
                .iter()
                .map(FileSummaryView::from_candidate)
                .collect(),
        }
    }

    /// Toast line shown once a batch lands.
    pub fn headline(&self) -> String {
        format!("{} file(s) uploaded and validated", self.file_count)
    }
}

pub(crate) fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0)
}

pub(crate) fn kind_label(mime_or_extension: &str) -> &'static str {
    if mime_or_extension.to_ascii_lowercase().contains("pdf") {
        "PDF"
    } else {
        "Document"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::domain::IntakeConfiguration;
    use crate::intake::filter::validate;

    #[test]
    fn megabytes_use_binary_units() {
        assert_eq!(format_megabytes(0), "0.00");
        assert_eq!(format_megabytes(1_048_576), "1.00");
        assert_eq!(format_megabytes(2_621_440), "2.50");
    }

    #[test]
    fn kind_label_only_distinguishes_pdf() {
        assert_eq!(kind_label("application/pdf"), "PDF");
        assert_eq!(kind_label(".PDF"), "PDF");
        assert_eq!(
            kind_label("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            "Document"
        );
        assert_eq!(kind_label(""), "Document");
    }

    #[test]
    fn summary_totals_batch() {
        let config = IntakeConfiguration::new([".pdf", ".docx"], 4).expect("valid");
        let batch = validate(
            AttemptId(3),
            vec![
                CandidateFile::new("annual.pdf", 1_048_576, "application/pdf"),
                CandidateFile::new("strategy.docx", 524_288, ""),
            ],
            &config,
        )
        .expect("batch");

        let summary = BatchSummary::from_batch(&batch);
        assert_eq!(summary.attempt, AttemptId(3));
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.total_bytes, 1_572_864);
        assert_eq!(summary.files[0].kind, "PDF");
        assert_eq!(summary.files[1].size_mb, "0.50");
        assert_eq!(summary.headline(), "2 file(s) uploaded and validated");
    }
}

use super::domain::{AttemptId, CandidateFile, IntakeConfiguration, IntakeRejection, ValidatedBatch};

/// Suffix match on the lower-cased file name. The declared type is ignored.
pub fn is_accepted(name: &str, config: &IntakeConfiguration) -> bool {
    let name = name.to_lowercase();
    config
        .accepted_extensions()
        .iter()
        .any(|extension| name.ends_with(extension.as_str()))
}

/// Drops unaccepted files, then applies the file-count ceiling to what is left.
pub fn validate(
    attempt: AttemptId,
    files: Vec<CandidateFile>,
    config: &IntakeConfiguration,
) -> Result<ValidatedBatch, IntakeRejection> {
    let accepted: Vec<CandidateFile> = files
        .into_iter()
        .filter(|file| is_accepted(&file.name, config))
        .collect();

    if accepted.is_empty() {
        return Err(IntakeRejection::NoValidFiles);
    }

    if accepted.len() > config.max_files() {
        return Err(IntakeRejection::TooManyFiles {
            max_files: config.max_files(),
            offered: accepted.len(),
        });
    }

    Ok(ValidatedBatch::new(attempt, accepted))
}

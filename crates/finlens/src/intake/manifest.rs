use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::CandidateFile;

#[derive(Debug)]
pub enum ManifestError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io(err) => write!(f, "failed to read upload manifest: {}", err),
            ManifestError::Csv(err) => write!(f, "invalid upload manifest: {}", err),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io(err) => Some(err),
            ManifestError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ManifestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ManifestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads candidate files from a `name,size_bytes,type` CSV listing.
pub struct UploadManifest;

impl UploadManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateFile>, ManifestError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateFile>, ManifestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut files = Vec::new();

        for row in csv_reader.deserialize::<ManifestRow>() {
            let row = row?;
            files.push(CandidateFile::new(
                row.name,
                row.size_bytes,
                row.kind.unwrap_or_default(),
            ));
        }

        Ok(files)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    name: String,
    size_bytes: u64,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

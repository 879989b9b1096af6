use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ImgGenError, Result};
use crate::model::ModelResponse;

/// `YYYYMMDDTHHMMSSZ.png`, second precision.
pub const FILENAME_FORMAT: &str = "%Y%m%dT%H%M%SZ.png";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedArtifact {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Decoded image bytes from the first part of the first candidate.
pub fn extract_image(response: ModelResponse) -> Result<Vec<u8>> {
    let part = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .ok_or(ImgGenError::NoCandidates)?;

    let inline = part.inline_data.ok_or(ImgGenError::NoImageData)?;
    let bytes = inline.data.into_bytes()?;
    if bytes.is_empty() {
        return Err(ImgGenError::NoImageData);
    }
    Ok(bytes)
}

pub fn artifact_filename(at: DateTime<Utc>) -> String {
    at.format(FILENAME_FORMAT).to_string()
}

/// Writes into the output directory; an existing file with the same name is truncated.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn persist_at(&self, bytes: &[u8], at: DateTime<Utc>) -> Result<PersistedArtifact> {
        let path = self.output_dir.join(artifact_filename(at));
        fs::write(&path, bytes).map_err(ImgGenError::generation_failed)?;
        debug!(path = %path.display(), bytes = bytes.len(), "image written");
        Ok(PersistedArtifact {
            path,
            created_at: at,
        })
    }

    pub fn materialize_at(
        &self,
        response: ModelResponse,
        at: DateTime<Utc>,
    ) -> Result<PersistedArtifact> {
        let bytes = extract_image(response)?;
        self.persist_at(&bytes, at)
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{EnvConfig, IMAGE_MODEL};
use crate::error::{ImgGenError, Result};
use crate::model::{ModelPart, ModelRequest};
use crate::tools::{ToolInvocation, INPUT_IMAGE_PATH, PROMPT};

pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Extension-based lookup; the file content is never inspected.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationRequest {
    TextToImage {
        prompt: String,
    },
    ImageToImage {
        source_image_bytes: Vec<u8>,
        source_mime_type: String,
        prompt: String,
    },
}

impl GenerationRequest {
    pub fn text_to_image(invocation: &ToolInvocation) -> Result<Self> {
        let prompt = require(invocation, PROMPT)?;
        Ok(GenerationRequest::TextToImage {
            prompt: prompt.to_string(),
        })
    }

    /// Validates both fields before touching the filesystem, then loads the source image.
    pub fn image_to_image(invocation: &ToolInvocation) -> Result<Self> {
        let raw_path = require(invocation, INPUT_IMAGE_PATH)?;
        let prompt = require(invocation, PROMPT)?;

        let path = resolve_source_path(raw_path)?;
        let source_image_bytes = fs::read(&path).map_err(ImgGenError::generation_failed)?;
        if source_image_bytes.is_empty() {
            return Err(ImgGenError::InvalidArgument {
                field: INPUT_IMAGE_PATH.to_string(),
                reason: "points at an empty file",
            });
        }

        Ok(GenerationRequest::ImageToImage {
            source_image_bytes,
            source_mime_type: mime_type_for(&path).to_string(),
            prompt: prompt.to_string(),
        })
    }

    pub fn prompt(&self) -> &str {
        match self {
            GenerationRequest::TextToImage { prompt } => prompt,
            GenerationRequest::ImageToImage { prompt, .. } => prompt,
        }
    }

    pub fn into_model_request(self) -> ModelRequest {
        let parts = match self {
            GenerationRequest::TextToImage { prompt } => vec![ModelPart::Text(prompt)],
            GenerationRequest::ImageToImage {
                source_image_bytes,
                source_mime_type,
                prompt,
            } => vec![
                ModelPart::InlineData {
                    mime_type: source_mime_type,
                    data: source_image_bytes,
                },
                ModelPart::Text(prompt),
            ],
        };
        ModelRequest::image_only(IMAGE_MODEL, parts)
    }
}

fn require<'a>(invocation: &'a ToolInvocation, field: &str) -> Result<&'a str> {
    invocation
        .str_arg(field)
        .ok_or_else(|| ImgGenError::missing(field))
}

/// Expands `~`, canonicalizes, and checks that the target is a regular file.
pub fn resolve_source_path(raw: &str) -> Result<PathBuf> {
    let expanded = EnvConfig::expand_home(raw);
    let path = match fs::canonicalize(&expanded) {
        Ok(path) => path,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ImgGenError::InputNotFound(expanded))
        }
        Err(err) => return Err(ImgGenError::generation_failed(err)),
    };

    let metadata = fs::metadata(&path).map_err(ImgGenError::generation_failed)?;
    if !metadata.is_file() {
        return Err(ImgGenError::InputNotAFile(path));
    }
    Ok(path)
}

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ImgGenError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Image,
}

/// One ordered element of the outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelPart {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

impl ModelPart {
    pub fn to_wire(&self) -> Value {
        match self {
            ModelPart::Text(text) => json!({ "text": text }),
            ModelPart::InlineData { mime_type, data } => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": general_purpose::STANDARD.encode(data),
                }
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    pub model: String,
    pub parts: Vec<ModelPart>,
    pub response_modalities: Vec<ResponseModality>,
}

impl ModelRequest {
    /// Request whose output is constrained to image content.
    pub fn image_only(model: impl Into<String>, parts: Vec<ModelPart>) -> Self {
        Self {
            model: model.into(),
            parts,
            response_modalities: vec![ResponseModality::Image],
        }
    }

    pub fn to_wire_body(&self) -> Value {
        let parts: Vec<Value> = self.parts.iter().map(ModelPart::to_wire).collect();
        json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": {
                "responseModalities": self.response_modalities,
            },
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, alias = "finish_reason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl ResponsePart {
    pub fn inline(mime_type: impl Into<String>, data: InlinePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: Some(mime_type.into()),
                data,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: InlinePayload,
}

/// Inline payload as delivered by the client: already-decoded bytes or base64 text.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlinePayload {
    Bytes(Vec<u8>),
    Base64(String),
}

impl InlinePayload {
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            InlinePayload::Bytes(bytes) => Ok(bytes),
            InlinePayload::Base64(text) => {
                let compact: String = text.split_ascii_whitespace().collect();
                general_purpose::STANDARD
                    .decode(compact.as_bytes())
                    .map_err(ImgGenError::generation_failed)
            }
        }
    }
}

impl From<Vec<u8>> for InlinePayload {
    fn from(bytes: Vec<u8>) -> Self {
        InlinePayload::Bytes(bytes)
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use gemini_imggen::model::{Candidate, Content, ResponsePart};
use gemini_imggen::{
    ImageModelClient, ImagePipeline, ImgGenError, InlinePayload, ModelRequest, ModelResponse,
    ServerConfig,
};
use tokio::sync::Mutex;

pub enum Reply {
    Respond(ModelResponse),
    Fail(String),
}

/// In-process model double that records every request it receives.
pub struct RecordingClient {
    reply: Reply,
    requests: Mutex<Vec<ModelRequest>>,
}

impl RecordingClient {
    pub fn responding(response: ModelResponse) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Respond(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn last_request(&self) -> Option<ModelRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl ImageModelClient for RecordingClient {
    async fn generate_content(&self, request: ModelRequest) -> gemini_imggen::Result<ModelResponse> {
        self.requests.lock().await.push(request);
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(ImgGenError::generation_failed_msg(
                "RecordingClient",
                message.clone(),
            )),
        }
    }
}

pub fn image_response(payload: InlinePayload) -> ModelResponse {
    ModelResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts: vec![ResponsePart::inline("image/png", payload)],
            }),
            finish_reason: Some("STOP".to_string()),
        }],
    }
}

pub fn pipeline_for(output_dir: &std::path::Path, client: Arc<RecordingClient>) -> ImagePipeline {
    let config = ServerConfig::new("test-key", output_dir);
    ImagePipeline::new(&config, client).expect("pipeline")
}

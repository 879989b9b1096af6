use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::client::ImageModelClient;
use super::types::{ModelRequest, ModelResponse};
use crate::config::ServerConfig;
use crate::error::{ImgGenError, Result};

const ERROR_BODY_LIMIT: usize = 500;

/// Gemini REST 客户端
///
/// 超时与连接池由这里负责，流水线本身不做重试。
#[derive(Clone)]
pub struct GeminiHttpClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GeminiHttpClient {
    fn create_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(ImgGenError::generation_failed)
    }

    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Self::create_client()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::new(config.api_base.clone(), config.api_key.clone())
    }

    pub fn endpoint_for_model(&self, model: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= ERROR_BODY_LIMIT {
        return text.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated, {} bytes total)", &text[..end], text.len())
}

#[async_trait]
impl ImageModelClient for GeminiHttpClient {
    #[instrument(skip(self, request), fields(model = %request.model, parts = request.parts.len()))]
    async fn generate_content(&self, request: ModelRequest) -> Result<ModelResponse> {
        let endpoint = self.endpoint_for_model(&request.model);
        let body = request.to_wire_body();

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ImgGenError::generation_failed)?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(ImgGenError::generation_failed)?;
        debug!(%status, bytes = response_text.len(), "generateContent responded");

        if !status.is_success() {
            return Err(ImgGenError::generation_failed_msg(
                "reqwest::StatusCode",
                format!(
                    "request failed with status {status}: {}\nEndpoint: {endpoint}",
                    truncate(&response_text)
                ),
            ));
        }

        serde_json::from_str(&response_text).map_err(ImgGenError::generation_failed)
    }
}

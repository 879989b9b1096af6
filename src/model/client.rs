use std::sync::Arc;

use async_trait::async_trait;

use super::types::{ModelRequest, ModelResponse};
use crate::error::Result;

/// 单次 `generateContent` 调用的抽象，实现方不保存调用间状态
#[async_trait]
pub trait ImageModelClient: Send + Sync {
    async fn generate_content(&self, request: ModelRequest) -> Result<ModelResponse>;
}

pub type DynImageModelClient = Arc<dyn ImageModelClient>;

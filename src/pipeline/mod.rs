//! 图片生成流水线
//!
//! 调用顺序：工具分发 → 参数校验与请求组装 → 模型调用 → 提取内联图片 → 落盘，
//! 成功时只返回文件路径。分发之后的任何错误都会在这里包装上操作名与诊断信息。

pub mod artifact;
pub mod request;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info};

pub use artifact::{artifact_filename, extract_image, ArtifactStore, PersistedArtifact};
pub use request::{mime_type_for, resolve_source_path, GenerationRequest, DEFAULT_MIME_TYPE};

use crate::config::ServerConfig;
use crate::error::{ImgGenError, Operation, Result};
use crate::model::DynImageModelClient;
use crate::tools::{ToolInvocation, ToolManifest, ToolRegistry, GENERATE_FROM_IMAGE};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct ImagePipeline {
    registry: ToolRegistry,
    client: DynImageModelClient,
    store: ArtifactStore,
    clock: Clock,
}

impl ImagePipeline {
    /// 输出目录在这里创建并规范化，之后返回的路径一定是绝对路径
    pub fn new(config: &ServerConfig, client: DynImageModelClient) -> Result<Self> {
        Ok(Self {
            registry: ToolRegistry::new(),
            client,
            store: ArtifactStore::new(config.resolved_output_dir()?),
            clock: Arc::new(Utc::now),
        })
    }

    /// 替换用于生成文件名的时钟
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn list_tools(&self) -> &'static [ToolManifest] {
        self.registry.list_tools()
    }

    /// 执行一次工具调用，返回写入图片的绝对路径
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let artifact = self.invoke(ToolInvocation::new(name, arguments)).await?;
        Ok(artifact.path.to_string_lossy().into_owned())
    }

    pub async fn invoke(&self, invocation: ToolInvocation) -> Result<PersistedArtifact> {
        let manifest = self
            .registry
            .manifest(&invocation.name)
            .ok_or_else(|| ImgGenError::UnknownTool(invocation.name.clone()))?;
        let operation = match manifest.name.as_str() {
            GENERATE_FROM_IMAGE => Operation::Transformation,
            _ => Operation::Generation,
        };
        info!(tool = %invocation.name, %operation, "tool invoked");

        match self.run(operation, &invocation).await {
            Ok(artifact) => {
                info!(tool = %invocation.name, path = %artifact.path.display(), "image saved");
                Ok(artifact)
            }
            Err(cause) => {
                let err = ImgGenError::in_pipeline(operation, &invocation.name, cause);
                error!(tool = %invocation.name, kind = %err.kind(), error = %err.cause(), "tool failed");
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        operation: Operation,
        invocation: &ToolInvocation,
    ) -> Result<PersistedArtifact> {
        let request = match operation {
            Operation::Generation => GenerationRequest::text_to_image(invocation)?,
            Operation::Transformation => GenerationRequest::image_to_image(invocation)?,
        };
        debug!(
            prompt_chars = request.prompt().chars().count(),
            "generation request assembled"
        );

        let response = self
            .client
            .generate_content(request.into_model_request())
            .await?;
        self.store.materialize_at(response, (self.clock)())
    }
}

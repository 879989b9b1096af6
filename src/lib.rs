pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod tools;
pub mod utils;

pub use config::{EnvConfig, ServerConfig, IMAGE_MODEL, SERVER_NAME};
pub use error::{ErrorKind, ImgGenError, Operation, Result};
#[cfg(feature = "gemini-client")]
pub use model::GeminiHttpClient;
pub use model::{
    DynImageModelClient, ImageModelClient, InlinePayload, ModelPart, ModelRequest, ModelResponse,
    ResponseModality,
};
pub use pipeline::{ArtifactStore, Clock, GenerationRequest, ImagePipeline, PersistedArtifact};
pub use server::McpServer;
pub use tools::{
    ToolInvocation, ToolManifest, ToolManifestBuilder, ToolPort, ToolRegistry,
    GENERATE_FROM_IMAGE, GENERATE_FROM_TEXT,
};
pub use utils::logging;

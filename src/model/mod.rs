//! 生成模型客户端
//!
//! - `ImageModelClient`: 模型调用的抽象，流水线只依赖该 trait
//! - `GeminiHttpClient`: 基于 REST `generateContent` 的默认实现
//! - `types`: 请求与响应的数据结构，包括内联数据的两种表示

pub mod client;
#[cfg(feature = "gemini-client")]
pub mod http;
pub mod types;

pub use client::{DynImageModelClient, ImageModelClient};
#[cfg(feature = "gemini-client")]
pub use http::GeminiHttpClient;
pub use types::{
    Candidate, Content, InlineData, InlinePayload, ModelPart, ModelRequest, ModelResponse,
    ResponseModality, ResponsePart,
};

//! MCP 传输层：基于 stdio 的逐行 JSON-RPC 2.0
//!
//! 只负责协议封装，工具列表与调用全部委托给 `ImagePipeline`。

pub mod protocol;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::SERVER_NAME;
use crate::error::{ImgGenError, Result};
use crate::pipeline::ImagePipeline;
use protocol::{
    failure, success, CallToolParams, CallToolResult, JsonRpcRequest, RpcError,
    DEFAULT_PROTOCOL_VERSION, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};

#[derive(Clone)]
pub struct McpServer {
    pipeline: ImagePipeline,
}

impl McpServer {
    pub fn new(pipeline: ImagePipeline) -> Self {
        Self { pipeline }
    }

    pub async fn serve_stdio(&self) -> Result<()> {
        info!(server = SERVER_NAME, "serving MCP over stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// 逐行处理消息，直到读端 EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(ImgGenError::generation_failed)?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                let mut encoded = response.to_string();
                encoded.push('\n');
                writer
                    .write_all(encoded.as_bytes())
                    .await
                    .map_err(ImgGenError::generation_failed)?;
                writer.flush().await.map_err(ImgGenError::generation_failed)?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(err) => {
                warn!(%err, "unparsable message");
                Some(failure(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("parse error: {err}")),
                ))
            }
        }
    }

    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => {
                return Some(failure(
                    Value::Null,
                    RpcError::new(INVALID_REQUEST, format!("invalid request: {err}")),
                ))
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        };

        Some(match outcome {
            Ok(result) => success(id, result),
            Err(error) => failure(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|params| params.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false },
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .pipeline
            .list_tools()
            .iter()
            .map(|manifest| manifest.descriptor())
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::new(INVALID_PARAMS, "missing params"))
            .and_then(|params| {
                serde_json::from_value(params).map_err(|err| {
                    RpcError::new(INVALID_PARAMS, format!("invalid params: {err}"))
                })
            })?;

        let result = match self.pipeline.call_tool(&params.name, params.arguments).await {
            Ok(path) => CallToolResult::text(path, false),
            Err(err) => CallToolResult::text(err.to_string(), true),
        };
        serde_json::to_value(result)
            .map_err(|err| RpcError::new(INTERNAL_ERROR, err.to_string()))
    }
}

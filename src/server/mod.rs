//! 调度循环：在双工字节流上读取 JSON-RPC 请求，逐个独立处理并写回结果。
//!
//! Dispatch loop.
//!
//! The only part of the crate that knows about the channel. Frames are
//! newline-delimited JSON-RPC 2.0. Each incoming frame is handled in its own
//! task; responses go through one writer task in completion order, so callers
//! must match them by `id`. At end of input the loop stops reading, lets
//! in-flight calls finish, flushes and returns.

pub mod jsonrpc;

use crate::tools::{DispatchError, ToolRegistry};
use crate::types::{ContentEnvelope, ToolInvocation};
use crate::{Error, ErrorContext, Result};
use jsonrpc::{
    JsonRpcMessage, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::Instrument;

/// Protocol revisions this server can speak; the last one is preferred.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug)]
pub struct McpServer {
    info: ServerInfo,
    registry: ToolRegistry,
    instructions: Option<String>,
}

impl McpServer {
    pub fn new(info: ServerInfo, registry: ToolRegistry) -> Self {
        Self {
            info,
            registry,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw frame. `None` when nothing should be written back.
    pub async fn handle_frame(&self, frame: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(frame) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable frame");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };
        let msg: JsonRpcMessage = match serde_json::from_value(value) {
            Ok(m) => m,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        };
        self.handle_message(msg).await
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<JsonRpcResponse> {
        let Some(method) = msg.method.as_deref() else {
            // A response or an empty object: nothing to answer.
            return None;
        };
        if msg.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            return msg.id.map(|id| {
                JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid request: jsonrpc must be \"2.0\"")
            });
        }
        if msg.is_notification() {
            tracing::debug!(method, "notification");
            return None;
        }
        let id = msg.id.clone().unwrap_or(Value::Null);

        let response = match method {
            "initialize" => JsonRpcResponse::result(id, self.initialize_result(msg.params.as_ref())),
            "ping" => JsonRpcResponse::result(id, json!({})),
            "tools/list" => JsonRpcResponse::result(id, json!({ "tools": self.registry.definitions() })),
            "resources/list" => JsonRpcResponse::result(id, json!({ "resources": [] })),
            "tools/call" => self.call_tool(id, msg.params).await,
            other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        };
        Some(response)
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .or_else(|| SUPPORTED_PROTOCOL_VERSIONS.last().copied())
            .unwrap_or_default();

        let mut result = json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": {}
            },
            "serverInfo": self.info,
        });
        if let Some(instructions) = &self.instructions {
            result["instructions"] = json!(instructions);
        }
        result
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let invocation: ToolInvocation = match params.map(serde_json::from_value) {
            Some(Ok(inv)) => inv,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Invalid params: missing tool name"),
        };

        let span = tracing::info_span!("tool_call", tool = %invocation.name, id = %id);
        let result = self.registry.call(&invocation).instrument(span).await;

        match result {
            Ok(envelope) => envelope_response(id, &envelope),
            Err(DispatchError::UnknownTool(name)) => {
                tracing::warn!(tool = %name, "unknown tool");
                JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {}", name))
            }
            Err(DispatchError::InvalidArguments(failure)) => {
                tracing::warn!(tool = %failure.tool, violations = failure.violations.len(), "argument validation failed");
                envelope_response(id, &ContentEnvelope::error_text(failure.to_string()))
            }
        }
    }

    /// Serve until `reader` reaches end of input.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(frame) = rx.recv().await {
                writer.write_all(frame.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            writer.flush().await?;
            Ok::<(), std::io::Error>(())
        });

        let mut frames = BufReader::new(reader).split(b'\n');
        while let Some(raw) = frames.next_segment().await? {
            let server = Arc::clone(&self);
            let tx = tx.clone();
            // Every frame is its own task; the task's sender keeps the writer alive until it is done.
            tokio::spawn(async move {
                let response = match String::from_utf8(raw) {
                    Ok(line) if line.trim().is_empty() => None,
                    Ok(line) => server.handle_frame(line.trim()).await,
                    Err(_) => Some(JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        "Parse error: frame is not valid UTF-8",
                    )),
                };
                if let Some(response) = response {
                    match serde_json::to_string(&response) {
                        Ok(frame) => {
                            if tx.send(frame).is_err() {
                                tracing::error!("channel writer closed before response was sent");
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "failed to serialize response"),
                    }
                }
            });
        }
        drop(tx);

        writer_task.await.map_err(|e| {
            Error::protocol_with_context(
                format!("writer task failed: {}", e),
                ErrorContext::new().with_source("dispatch_loop"),
            )
        })??;
        Ok(())
    }

    /// Serve on this process's stdin/stdout.
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        tracing::info!("{} MCP Server running on stdio", self.info.name);
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

fn envelope_response(id: Value, envelope: &ContentEnvelope) -> JsonRpcResponse {
    match serde_json::to_value(envelope) {
        Ok(v) => JsonRpcResponse::result(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e)),
    }
}

//! # geoweather-mcp
//!
//! 天气与地图工具网关：通过 MCP 向智能体宿主暴露心知天气与高德地图工具。
//!
//! A tool-invocation gateway that exposes weather (Seniverse) and mapping
//! (AMap geocoding, driving routes, static maps) tools to an agent host over
//! the Model Context Protocol. Every tool call makes one HTTP request and
//! answers with a uniform, non-empty list of text or image blocks.
//!
//! ## Flow of one invocation
//!
//! ```text
//! server (dispatch loop)
//!   └─ tools::ToolRegistry::call
//!        ├─ schema::ArgumentShape::bind      raw JSON → typed args
//!        ├─ request::<builder>               typed args → ProviderRequest
//!        ├─ provider::<fetch + classify>     ProviderRequest → Outcome
//!        └─ format::render_<tool>            Outcome → ContentEnvelope
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geoweather_mcp::{GatewayConfig, McpServer, Profile, ProviderContext, ServerInfo};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> geoweather_mcp::Result<()> {
//!     let config = Arc::new(GatewayConfig::from_env()?);
//!     let ctx = ProviderContext::new(config)?;
//!     let profile = Profile::All;
//!     let server = McpServer::new(ServerInfo::new(profile.server_name()), profile.registry(&ctx)?);
//!     Arc::new(server).serve_stdio().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Provider keys, endpoints, static-map parameters, render policy |
//! | [`types`] | Tool definitions, invocations, content blocks and envelopes |
//! | [`schema`] | Argument shapes and binding |
//! | [`request`] | Pure request builders, one per tool |
//! | [`provider`] | HTTP transport and outcome classification |
//! | [`format`] | Outcome → envelope rendering |
//! | [`tools`] | The four tools and the registry |
//! | [`server`] | JSON-RPC dispatch loop |

pub mod config;
pub mod format;
pub mod provider;
pub mod request;
pub mod schema;
pub mod server;
pub mod tools;
pub mod types;

pub use config::GatewayConfig;
pub use format::RenderPolicy;
pub use provider::{Outcome, OutcomeKind};
pub use schema::{FieldViolation, ValidationFailure};
pub use server::{McpServer, ServerInfo};
pub use tools::{Profile, ProviderContext, Tool, ToolRegistry};
pub use types::{ContentBlock, ContentEnvelope, ToolDefinition, ToolInvocation};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

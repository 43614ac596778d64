//! 工具注册表：工具名 → (参数形状, 处理器)。
//!
//! Tool registry.
//!
//! A [`Tool`] declares its typed arguments and turns them into a
//! [`ContentEnvelope`]. Registering it compiles the argument shape once and
//! stores an erased handle; [`ToolRegistry::call`] binds raw arguments and
//! runs the handler. Handlers share only read-only state.

pub mod geo;
pub mod weather;

pub use geo::{GeocodeTool, RoutePlanTool, StaticMapTool};
pub use weather::ForecastTool;

use crate::config::GatewayConfig;
use crate::provider::HttpTransport;
use crate::schema::{ArgumentShape, ValidationFailure};
use crate::types::{ContentEnvelope, ToolDefinition, ToolInvocation};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A named operation with a typed argument shape.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send + 'static;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Must not fail: every outcome is rendered into the envelope.
    async fn run(&self, args: Self::Args) -> ContentEnvelope;
}

/// Read-only state every provider-backed tool needs.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub config: Arc<GatewayConfig>,
    pub transport: HttpTransport,
}

impl ProviderContext {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self { config, transport })
    }
}

#[async_trait]
trait ErasedTool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn invoke(&self, raw: &Value) -> std::result::Result<ContentEnvelope, ValidationFailure>;
}

struct BoundTool<T: Tool> {
    tool: T,
    shape: ArgumentShape,
    definition: ToolDefinition,
}

#[async_trait]
impl<T: Tool> ErasedTool for BoundTool<T> {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, raw: &Value) -> std::result::Result<ContentEnvelope, ValidationFailure> {
        let args: T::Args = self.shape.bind(self.tool.name(), raw)?;
        Ok(self.tool.run(args).await)
    }
}

/// Why a call never reached a handler.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    InvalidArguments(#[from] ValidationFailure),
}

/// Tool name → handler, in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ErasedTool>>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool>(&mut self, tool: T) -> Result<()> {
        let name = tool.name();
        if self.index.contains_key(name) {
            return Err(Error::configuration_with_context(
                format!("tool '{}' is already registered", name),
                ErrorContext::new().with_source("tool_registry"),
            ));
        }
        let shape = ArgumentShape::of::<T::Args>()?;
        let definition = ToolDefinition {
            name: name.to_string(),
            description: tool.description().to_string(),
            input_schema: shape.schema().clone(),
        };
        tracing::debug!(tool = name, "registered tool");
        self.index.insert(name.to_string(), self.tools.len());
        self.tools.push(Arc::new(BoundTool {
            tool,
            shape,
            definition,
        }));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.definition().name.as_str())
            .collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition().clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| self.tools[i].definition())
    }

    /// Bind and run one invocation.
    pub async fn call(
        &self,
        invocation: &ToolInvocation,
    ) -> std::result::Result<ContentEnvelope, DispatchError> {
        let tool = self
            .index
            .get(&invocation.name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| DispatchError::UnknownTool(invocation.name.clone()))?;
        let raw = invocation.raw_arguments();
        Ok(tool.invoke(&raw).await?)
    }
}

/// Which tool set a server process exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// `get-forecast` only.
    Weather,
    /// Geocoding, route planning and route drawing.
    PathGuide,
    #[default]
    All,
}

impl Profile {
    pub fn server_name(&self) -> &'static str {
        match self {
            Profile::Weather => "weather",
            Profile::PathGuide => "path-guide",
            Profile::All => "geoweather",
        }
    }

    /// A registry holding this profile's tools.
    pub fn registry(&self, ctx: &ProviderContext) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        if matches!(self, Profile::Weather | Profile::All) {
            registry.register(ForecastTool::new(ctx.clone()))?;
        }
        if matches!(self, Profile::PathGuide | Profile::All) {
            registry.register(GeocodeTool::new(ctx.clone()))?;
            registry.register(RoutePlanTool::new(ctx.clone()))?;
            registry.register(StaticMapTool::new(ctx.clone()))?;
        }
        Ok(registry)
    }
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(Profile::Weather),
            "path-guide" | "path_guide" | "pathguide" => Ok(Profile::PathGuide),
            "all" => Ok(Profile::All),
            other => Err(Error::configuration_with_context(
                format!("unknown profile '{}'", other),
                ErrorContext::new()
                    .with_field_path("--profile")
                    .with_details("expected weather, path-guide or all"),
            )),
        }
    }
}

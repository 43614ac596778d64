//! 类型模块：工具定义、调用请求与统一内容信封。
//!
//! # Types Module
//!
//! Wire-level types shared by the registry, formatter and dispatch loop.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ToolDefinition`] | Name, description and input schema of a tool |
//! | [`ToolInvocation`] | Tool name plus raw JSON arguments |
//! | [`ContentBlock`] | A `text` or `image` block |
//! | [`ContentEnvelope`] | Ordered, non-empty list of blocks returned per call |

pub mod content;
pub mod tool;

pub use content::{ContentBlock, ContentEnvelope};
pub use tool::{ToolDefinition, ToolInvocation};

//! Integration tests with stub provider servers

pub mod stdio_channel;
pub mod tool_calls;

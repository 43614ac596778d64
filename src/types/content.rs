//! Content blocks and the envelope every tool call returns.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/png";

/// One typed block of tool output, in MCP wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image {
        /// Base64 of the raw image bytes, no data-URI prefix.
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image_base64(data: String, mime_type: Option<String>) -> Self {
        ContentBlock::Image {
            data,
            mime_type: mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MEDIA_TYPE.to_string()),
        }
    }

    pub fn image_from_bytes(bytes: &[u8], mime_type: Option<String>) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::image_base64(data, mime_type)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image { .. })
    }

    /// The block's value: text for text blocks, base64 payload for images.
    pub fn value(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
            ContentBlock::Image { data, .. } => data,
        }
    }

}

/// Ordered, never-empty list of content blocks: the result of one invocation.
///
/// There is no constructor for an empty envelope; failures carry a text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEnvelope {
    content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    is_error: bool,
}

impl ContentEnvelope {
    pub fn new(first: ContentBlock, rest: impl IntoIterator<Item = ContentBlock>) -> Self {
        let mut content = vec![first];
        content.extend(rest);
        Self {
            content,
            is_error: false,
        }
    }

    pub fn single(block: ContentBlock) -> Self {
        Self {
            content: vec![block],
            is_error: false,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::single(ContentBlock::text(text))
    }

    /// A single text block flagged as an error result.
    pub fn error_text(text: impl Into<String>) -> Self {
        Self::text(text).into_error()
    }

    pub fn into_error(mut self) -> Self {
        self.is_error = true;
        self
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn first(&self) -> &ContentBlock {
        &self.content[0]
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Envelopes are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Every text block's text, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter(|b| b.is_text())
            .map(ContentBlock::value)
            .collect()
    }
}

//! Chat-completion types and the vision client seam.
//!
//! The remote model is an OpenAI-compatible chat API that accepts multimodal
//! content (text + images as data URIs) and reports token usage. The
//! [`VisionClient`] trait is the boundary the batch pipeline talks through;
//! [`ark::ArkClient`] is the production implementation and tests substitute
//! scripted fakes.

pub mod ark;

pub use ark::ArkClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Image URL wrapper for vision content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Content part for multimodal messages (text or image).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// Create a text content part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create an image URL content part.
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Message content - either simple text or multimodal (text + images).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a user message carrying a prompt followed by images.
    pub fn user_with_images(
        prompt: impl Into<String>,
        image_urls: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut parts = vec![ContentPart::text(prompt)];
        parts.extend(image_urls.into_iter().map(ContentPart::image_url));
        ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Token usage reported by the provider, if any.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Trait for vision-capable chat clients.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Send one chat completion request and wait for the full response.
    async fn chat_completion(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatResponse>;
}

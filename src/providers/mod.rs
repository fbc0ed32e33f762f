/*!
 * Provider implementations for media generation services.
 *
 * This module contains client implementations for the generation backends:
 * - Gemini: image generation for shot key frames
 * - Veo: video generation for whole shots
 * - Mock: in-process provider for tests
 *
 * Providers only consume fully resolved prompt text; they never see
 * placeholders.
 */

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};

use crate::errors::ProviderError;

pub mod gemini;
pub mod mock;
pub mod veo;

/// 1x1 PNG returned by the image provider when no API key is configured
pub const PLACEHOLDER_IMAGE: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc, 0xcf, 0xc0, 0x50,
    0x0f, 0x00, 0x04, 0x85, 0x01, 0x80, 0x84, 0xa9, 0x8c, 0x21, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Payload returned by the video provider when no API key is configured
pub const PLACEHOLDER_VIDEO: &[u8] = b"MOCK_VIDEO_DATA";

/// Kind of media a provider produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Fully resolved prompt text
    pub prompt: String,
    /// Optional image that guides generation (reference frame or start frame)
    pub reference_image: Option<PathBuf>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_image: None,
        }
    }

    pub fn with_reference_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_image = Some(path.into());
        self
    }
}

/// Common trait for all media generation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the controller.
#[async_trait]
pub trait MediaProvider: Send + Sync + Debug {
    /// Kind of media this provider generates
    fn kind(&self) -> MediaKind;

    /// Generate media for the request
    ///
    /// # Returns
    /// * `Result<Bytes, ProviderError>` - The raw image or video bytes, or an error
    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes, ProviderError>;

    /// Whether the provider returns placeholder payloads instead of calling an API
    fn is_mock(&self) -> bool {
        false
    }
}

/// Image attached to a request, read from disk and base64 encoded
#[derive(Debug, Clone)]
pub(crate) struct EncodedImage {
    pub mime_type: &'static str,
    pub data: String,
}

pub(crate) async fn encode_image(path: &Path) -> Result<EncodedImage, ProviderError> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        ProviderError::InvalidInput(format!("Failed to read reference image {:?}: {}", path, e))
    })?;

    Ok(EncodedImage {
        mime_type: image_mime_type(path),
        data: STANDARD.encode(content),
    })
}

pub(crate) fn decode_base64(data: &str) -> Result<Bytes, ProviderError> {
    STANDARD
        .decode(data.trim())
        .map(Bytes::from)
        .map_err(|e| ProviderError::ParseError(format!("Invalid base64 payload: {}", e)))
}

fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Reject requests that would waste an API call.
pub(crate) fn check_request(request: &GenerationRequest) -> Result<(), ProviderError> {
    if request.prompt.trim().is_empty() {
        return Err(ProviderError::InvalidInput("Prompt is empty".to_string()));
    }
    Ok(())
}

/// Map a non-success HTTP response to a provider error.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, message);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::AuthenticationError(format!(
            "{} rejected the API key ({})",
            provider, status
        )));
    }

    Err(ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}

/// Map a transport failure to a provider error.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, error))
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ImageProviderConfig;
use crate::errors::ProviderError;
use crate::providers::{
    check_request, decode_base64, encode_image, error_for_status, transport_error,
    GenerationRequest, MediaKind, MediaProvider, PLACEHOLDER_IMAGE,
};

/// Gemini client for key frame image generation
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key; empty means mock mode
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Model path, e.g. `models/gemini-3-pro-image-preview`
    model: String,
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// One part of a message: text or inline binary data
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(alias = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_modalities: Vec<&'static str>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(config: &ImageProviderConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
        }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }

    async fn build_request(&self, request: &GenerationRequest) -> Result<GeminiRequest, ProviderError> {
        let mut parts = vec![GeminiPart {
            text: Some(request.prompt.clone()),
            inline_data: None,
        }];

        if let Some(path) = &request.reference_image {
            let image = encode_image(path).await?;
            parts.push(GeminiPart {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.to_string(),
                    data: image.data,
                }),
            });
        }

        Ok(GeminiRequest {
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_k: self.top_k,
                top_p: self.top_p,
                max_output_tokens: 8192,
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        })
    }

    /// Extract the first inline image from a response
    pub fn extract_image(response: &GeminiResponse) -> Result<Bytes, ProviderError> {
        let inline = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|part| part.inline_data.as_ref()))
            .ok_or_else(|| {
                ProviderError::ParseError("Could not find image data in Gemini response".to_string())
            })?;

        decode_base64(&inline.data)
    }
}

#[async_trait]
impl MediaProvider for Gemini {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn is_mock(&self) -> bool {
        self.api_key.is_empty()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes, ProviderError> {
        check_request(request)?;

        if self.is_mock() {
            warn!("Gemini API key is missing, returning placeholder image");
            return Ok(Bytes::from_static(PLACEHOLDER_IMAGE));
        }

        let body = self.build_request(request).await?;
        debug!("Requesting image from {}", self.model);

        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        let response = error_for_status("Gemini", response).await?;

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini response: {}", e)))?;

        Self::extract_image(&gemini_response)
    }
}

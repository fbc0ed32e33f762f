use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::VideoProviderConfig;
use crate::errors::ProviderError;
use crate::providers::{
    check_request, decode_base64, encode_image, error_for_status, transport_error,
    GenerationRequest, MediaKind, MediaProvider, PLACEHOLDER_VIDEO,
};

/// Veo client for shot video generation
#[derive(Debug)]
pub struct Veo {
    client: Client,
    /// API key; empty means mock mode
    api_key: String,
    endpoint: String,
    model: String,
    duration_secs: u32,
    aspect_ratio: String,
}

/// Video generation request body
#[derive(Debug, Serialize)]
pub struct VeoRequest {
    prompt: String,
    duration_seconds: u32,
    aspect_ratio: String,
    /// Start frame the video should animate from
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VeoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VeoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

/// Video generation response: inline bytes or a download link
#[derive(Debug, Deserialize)]
pub struct VeoResponse {
    #[serde(default)]
    video_bytes: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl Veo {
    /// Create a new Veo client
    pub fn new(config: &VideoProviderConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            duration_secs: config.duration_secs,
            aspect_ratio: config.aspect_ratio.clone(),
        }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}:generate",
            self.endpoint.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }

    async fn build_request(&self, request: &GenerationRequest) -> Result<VeoRequest, ProviderError> {
        let image = match &request.reference_image {
            Some(path) => {
                let encoded = encode_image(path).await?;
                Some(VeoImage {
                    bytes_base64_encoded: encoded.data,
                    mime_type: encoded.mime_type.to_string(),
                })
            }
            None => None,
        };

        Ok(VeoRequest {
            prompt: request.prompt.clone(),
            duration_seconds: self.duration_secs,
            aspect_ratio: self.aspect_ratio.clone(),
            image,
        })
    }

    async fn download(&self, url: &str) -> Result<Bytes, ProviderError> {
        debug!("Downloading generated video from {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("Veo", e))?;

        let response = error_for_status("Veo", response).await?;
        response
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to download video: {}", e)))
    }
}

#[async_trait]
impl MediaProvider for Veo {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn is_mock(&self) -> bool {
        self.api_key.is_empty()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes, ProviderError> {
        check_request(request)?;

        if self.is_mock() {
            warn!("Veo API key is missing, returning placeholder video");
            return Ok(Bytes::from_static(PLACEHOLDER_VIDEO));
        }

        let body = self.build_request(request).await?;
        debug!("Requesting video from {}", self.model);

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Veo", e))?;

        let response = error_for_status("Veo", response).await?;

        let veo_response = response
            .json::<VeoResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Veo response: {}", e)))?;

        match (veo_response.video_bytes, veo_response.video_url) {
            (Some(data), _) => decode_base64(&data),
            (None, Some(url)) => self.download(&url).await,
            (None, None) => Err(ProviderError::ParseError(
                "Veo response contains neither video_bytes nor video_url".to_string(),
            )),
        }
    }
}

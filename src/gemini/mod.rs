pub mod image_client;
pub mod traits;
pub mod vision_client;

use crate::{
    config::GeminiConfig,
    error::{DecorError, Result},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use image_client::ImageClient;
pub use traits::{ImageAnalyzer, ImageGenerator};
pub use vision_client::VisionClient;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    vision_client: VisionClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DecorError::ConfigError("GEMINI_API_KEY is not set".into()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DecorError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let transport = Transport {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        };

        Ok(Self {
            image_client: ImageClient::new(transport.clone()),
            vision_client: VisionClient::new(transport),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn vision(&self) -> &VisionClient {
        &self.vision_client
    }
}

/// HTTP plumbing shared by the image and vision clients.
#[derive(Clone)]
pub(crate) struct Transport {
    http: Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    /// `{base}/models/{model}:{method}`; a `models/` prefix on the model id is tolerated.
    pub(crate) fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    pub(crate) async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        check_status(response, url).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

/// Unknown methods and models surface as 404/405/501; those become
/// `InterfaceMismatch`, everything else an `ApiError`.
async fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.trim().to_string());

    log::debug!("Gemini API returned {} for {}: {}", status, url, message);

    let unimplemented = detail
        .as_ref()
        .and_then(|d| d.status.as_deref())
        .is_some_and(|s| s == "UNIMPLEMENTED");

    match status.as_u16() {
        404 | 405 | 501 => Err(DecorError::InterfaceMismatch(format!(
            "{} is not available: {}",
            url, message
        ))),
        _ if unimplemented => Err(DecorError::InterfaceMismatch(format!(
            "{} is not implemented: {}",
            url, message
        ))),
        code => Err(DecorError::ApiError {
            status: code,
            message,
        }),
    }
}

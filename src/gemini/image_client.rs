use crate::{
    error::{DecorError, Result},
    gemini::{traits::ImageGenerator, Transport},
    models::{
        GenerateImagesConfig, GenerateImagesRequest, GenerateImagesResponse, GeneratedImage,
        ImageEntryPoint, ImageGenerationRequest, PredictInstance, PredictParameters,
        PredictRequest, PredictResponse,
    },
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct ImageClient {
    transport: Transport,
}

impl ImageClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    async fn generate_via_generate_images(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Vec<GeneratedImage>> {
        let url = self.transport.endpoint(
            &request.model,
            ImageEntryPoint::GenerateImages.method_name(),
        );
        let payload = GenerateImagesRequest {
            prompt: request.prompt.clone(),
            config: GenerateImagesConfig {
                number_of_images: request.number_of_images,
            },
        };

        let response: GenerateImagesResponse = self
            .transport
            .post_json(&url, &payload)
            .await?
            .json()
            .await
            .map_err(|e| DecorError::ResponseError(e.to_string()))?;

        response
            .generated_images
            .into_iter()
            .filter_map(|entry| entry.image)
            .map(|payload| {
                let data = payload.image_bytes.ok_or_else(|| {
                    DecorError::ResponseError("Generated image has no bytes".into())
                })?;
                GeneratedImage::from_base64(&data, payload.mime_type.as_deref())
            })
            .collect()
    }

    async fn generate_via_predict(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Vec<GeneratedImage>> {
        let url = self
            .transport
            .endpoint(&request.model, ImageEntryPoint::Predict.method_name());
        let payload = PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: request.number_of_images,
            },
        };

        let response: PredictResponse = self
            .transport
            .post_json(&url, &payload)
            .await?
            .json()
            .await
            .map_err(|e| DecorError::ResponseError(e.to_string()))?;

        // Filtered predictions come back without bytes.
        response
            .predictions
            .into_iter()
            .filter_map(|prediction| {
                let mime_type = prediction.mime_type;
                prediction
                    .bytes_base64_encoded
                    .map(|data| GeneratedImage::from_base64(&data, mime_type.as_deref()))
            })
            .collect()
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate_images(
        &self,
        entry_point: ImageEntryPoint,
        request: &ImageGenerationRequest,
    ) -> Result<Vec<GeneratedImage>> {
        log::info!(
            "Generating {} image(s) with model {} via {}",
            request.number_of_images,
            request.model,
            entry_point
        );

        match entry_point {
            ImageEntryPoint::GenerateImages => self.generate_via_generate_images(request).await,
            ImageEntryPoint::Predict => self.generate_via_predict(request).await,
        }
    }
}

use crate::{
    error::Result,
    models::{GeneratedImage, ImageEntryPoint, ImageGenerationRequest, VisionRequest},
};
use async_trait::async_trait;

/// Text-to-image capability of the hosted service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Calls the named entry point. Implementations report a missing entry
    /// point as `DecorError::InterfaceMismatch` so callers can fall back.
    async fn generate_images(
        &self,
        entry_point: ImageEntryPoint,
        request: &ImageGenerationRequest,
    ) -> Result<Vec<GeneratedImage>>;
}

/// Multimodal (image + text in, text out) capability of the hosted service.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, request: &VisionRequest) -> Result<String>;
}

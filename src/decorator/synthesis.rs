use crate::{
    decorator::notices::Notices,
    error::{DecorError, Result},
    gemini::ImageGenerator,
    models::{GeneratedImage, ImageEntryPoint, ImageGenerationRequest, Style},
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const PROMPT_SUFFIX: &str = "High quality, 8k resolution, architectural photography.";

/// Notes are embedded verbatim.
pub fn build_prompt(style: Style, notes: &str) -> String {
    format!(
        "A photorealistic interior design photo of a {} room. {}. {}",
        style, notes, PROMPT_SUFFIX
    )
}

/// Produces one redesigned room image per call.
///
/// The image service has exposed its text-to-image operation under more than
/// one name. The first call probes [`ImageEntryPoint::PROBE_ORDER`], moving to
/// the next entry point only when the service reports an interface mismatch,
/// and binds whichever one answers. Later calls go straight to the bound
/// entry point.
pub struct ImageSynthesisInvoker {
    generator: Arc<dyn ImageGenerator>,
    model: String,
    bound: OnceCell<ImageEntryPoint>,
}

impl ImageSynthesisInvoker {
    pub fn new(generator: Arc<dyn ImageGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
            bound: OnceCell::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn bound_entry_point(&self) -> Option<ImageEntryPoint> {
        self.bound.get().copied()
    }

    /// Failures are reported on `notices` and come back as `None`.
    pub async fn invoke(
        &self,
        style: Style,
        notes: &str,
        notices: &mut Notices,
    ) -> Option<GeneratedImage> {
        match self.try_invoke(style, notes).await {
            Ok(image) => Some(image),
            Err(e) => {
                notices.error(format!("Image generation failed: {}", e));
                None
            }
        }
    }

    pub async fn try_invoke(&self, style: Style, notes: &str) -> Result<GeneratedImage> {
        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: build_prompt(style, notes),
            number_of_images: 1,
        };
        log::debug!("Image prompt: {}", request.prompt);

        let images = match self.bound.get() {
            Some(entry_point) => {
                self.generator
                    .generate_images(*entry_point, &request)
                    .await?
            }
            None => self.resolve_and_generate(&request).await?,
        };

        images
            .into_iter()
            .next()
            .ok_or_else(|| DecorError::GenerationError("The service returned no images".into()))
    }

    async fn resolve_and_generate(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<Vec<GeneratedImage>> {
        let mut mismatches = Vec::new();
        let last = ImageEntryPoint::PROBE_ORDER.len() - 1;

        for (index, entry_point) in ImageEntryPoint::PROBE_ORDER.into_iter().enumerate() {
            // Every earlier entry point is missing, so this one is the only candidate left.
            if index == last && self.bound.set(entry_point).is_ok() {
                log::info!("Image generation bound to '{}'", entry_point);
            }

            match self.generator.generate_images(entry_point, request).await {
                Ok(images) => {
                    if self.bound.set(entry_point).is_ok() {
                        log::info!("Image generation bound to '{}'", entry_point);
                    }
                    return Ok(images);
                }
                Err(e) if e.is_interface_mismatch() => {
                    log::info!("Entry point '{}' unavailable: {}", entry_point, e);
                    mismatches.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        Err(DecorError::GenerationError(format!(
            "No image generation entry point is available ({})",
            mismatches.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted generator: pops one answer per call and records every call.
    struct ScriptedGenerator {
        answers: Mutex<Vec<Result<Vec<GeneratedImage>>>>,
        calls: Mutex<Vec<(ImageEntryPoint, ImageGenerationRequest)>>,
    }

    impl ScriptedGenerator {
        fn new(answers: Vec<Result<Vec<GeneratedImage>>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ImageEntryPoint, ImageGenerationRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageGenerator for ScriptedGenerator {
        async fn generate_images(
            &self,
            entry_point: ImageEntryPoint,
            request: &ImageGenerationRequest,
        ) -> Result<Vec<GeneratedImage>> {
            self.calls
                .lock()
                .unwrap()
                .push((entry_point, request.clone()));
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(DecorError::GenerationError("no scripted answer".into())))
        }
    }

    fn image() -> GeneratedImage {
        GeneratedImage::new(vec![1, 2, 3], "image/png")
    }

    fn mismatch() -> DecorError {
        DecorError::InterfaceMismatch("not found".into())
    }

    #[test]
    fn test_prompt_contains_style_and_notes_verbatim() {
        let notes = "Make the sofa dark blue, add a \"large\" rug & <plants>";
        let prompt = build_prompt(Style::MidCenturyModern, notes);
        assert!(prompt.contains("Mid-Century Modern"));
        assert!(prompt.contains(notes));
        assert!(prompt.ends_with(PROMPT_SUFFIX));
    }

    #[tokio::test]
    async fn test_primary_entry_point_success() {
        let generator = ScriptedGenerator::new(vec![Ok(vec![image()])]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        let result = invoker.try_invoke(Style::Cyberpunk, "neon").await.unwrap();
        assert_eq!(result, image());

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ImageEntryPoint::GenerateImages);
        assert_eq!(calls[0].1.number_of_images, 1);
        assert_eq!(calls[0].1.model, "imagen");
        assert_eq!(
            invoker.bound_entry_point(),
            Some(ImageEntryPoint::GenerateImages)
        );
    }

    #[tokio::test]
    async fn test_falls_back_with_identical_arguments() {
        let generator = ScriptedGenerator::new(vec![Err(mismatch()), Ok(vec![image()])]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        let result = invoker.try_invoke(Style::Scandinavian, "birch").await;
        assert!(result.is_ok());

        let calls = generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, ImageEntryPoint::GenerateImages);
        assert_eq!(calls[1].0, ImageEntryPoint::Predict);
        assert_eq!(calls[0].1, calls[1].1);
        assert_eq!(invoker.bound_entry_point(), Some(ImageEntryPoint::Predict));
    }

    #[tokio::test]
    async fn test_bound_entry_point_is_reused() {
        let generator = ScriptedGenerator::new(vec![
            Err(mismatch()),
            Ok(vec![image()]),
            Ok(vec![image()]),
        ]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        invoker.try_invoke(Style::Cyberpunk, "one").await.unwrap();
        invoker.try_invoke(Style::Cyberpunk, "two").await.unwrap();

        let entry_points: Vec<_> = generator.calls().into_iter().map(|(e, _)| e).collect();
        assert_eq!(
            entry_points,
            vec![
                ImageEntryPoint::GenerateImages,
                ImageEntryPoint::Predict,
                ImageEntryPoint::Predict
            ]
        );
    }

    #[tokio::test]
    async fn test_both_entry_points_missing_fails_as_value() {
        let generator = ScriptedGenerator::new(vec![Err(mismatch()), Err(mismatch())]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");
        let mut notices = Notices::new();

        let result = invoker.invoke(Style::BohemianChic, "", &mut notices).await;
        assert!(result.is_none());
        assert!(notices.has_errors());
        assert_eq!(generator.calls().len(), 2);
        assert_eq!(invoker.bound_entry_point(), Some(ImageEntryPoint::Predict));
    }

    #[tokio::test]
    async fn test_missing_primary_is_not_probed_again_after_alternate_fails() {
        let generator = ScriptedGenerator::new(vec![
            Err(mismatch()),
            Err(DecorError::ApiError {
                status: 503,
                message: "unavailable".into(),
            }),
            Ok(vec![image()]),
        ]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        let err = invoker.try_invoke(Style::Cyberpunk, "one").await.unwrap_err();
        assert!(matches!(err, DecorError::ApiError { status: 503, .. }));
        assert_eq!(invoker.bound_entry_point(), Some(ImageEntryPoint::Predict));

        invoker.try_invoke(Style::Cyberpunk, "two").await.unwrap();

        let entry_points: Vec<_> = generator.calls().into_iter().map(|(e, _)| e).collect();
        assert_eq!(
            entry_points,
            vec![
                ImageEntryPoint::GenerateImages,
                ImageEntryPoint::Predict,
                ImageEntryPoint::Predict
            ]
        );
    }

    #[tokio::test]
    async fn test_primary_failure_other_than_mismatch_binds_nothing() {
        let generator = ScriptedGenerator::new(vec![
            Err(DecorError::RequestError("timeout".into())),
            Ok(vec![image()]),
        ]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        assert!(invoker.try_invoke(Style::Cyberpunk, "one").await.is_err());
        assert!(invoker.bound_entry_point().is_none());

        invoker.try_invoke(Style::Cyberpunk, "two").await.unwrap();
        assert_eq!(
            invoker.bound_entry_point(),
            Some(ImageEntryPoint::GenerateImages)
        );
    }

    #[tokio::test]
    async fn test_other_failures_do_not_fall_back() {
        let generator = ScriptedGenerator::new(vec![Err(DecorError::ApiError {
            status: 429,
            message: "quota".into(),
        })]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        let err = invoker
            .try_invoke(Style::IndustrialLoft, "brick")
            .await
            .unwrap_err();
        assert!(matches!(err, DecorError::ApiError { status: 429, .. }));
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_alternate_failure_fails_operation() {
        let generator = ScriptedGenerator::new(vec![
            Err(mismatch()),
            Err(DecorError::RequestError("connection reset".into())),
        ]);
        let invoker = ImageSynthesisInvoker::new(generator.clone(), "imagen");

        let err = invoker
            .try_invoke(Style::LuxuryArtDeco, "gold")
            .await
            .unwrap_err();
        assert!(matches!(err, DecorError::RequestError(_)));
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_image_list_is_a_failure() {
        let generator = ScriptedGenerator::new(vec![Ok(Vec::new())]);
        let invoker = ImageSynthesisInvoker::new(generator, "imagen");

        let err = invoker
            .try_invoke(Style::ModernMinimalist, "")
            .await
            .unwrap_err();
        assert!(matches!(err, DecorError::GenerationError(_)));
    }
}

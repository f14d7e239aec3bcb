pub mod extraction;
pub mod links;
pub mod notices;
pub mod synthesis;

use crate::{
    config::Config,
    error::{DecorError, Result},
    gemini::{GeminiClient, ImageAnalyzer, ImageGenerator},
    logger,
    models::{DesignMode, GeneratedImage, GenerationRequest, ProductList, SourceImage, Style},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub use extraction::{parse_products, strip_code_fence, ProductExtractor, EXTRACTION_PROMPT};
pub use links::build_link;
pub use notices::{Notice, NoticeLevel, Notices};
pub use synthesis::{build_prompt, ImageSynthesisInvoker};

struct Services {
    synthesis: ImageSynthesisInvoker,
    extraction: ProductExtractor,
}

/// Pipeline stage about to make an external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesis,
    Extraction,
}

impl Stage {
    pub fn busy_message(&self) -> &'static str {
        match self {
            Stage::Synthesis => "🤖 AI is processing... (Generating new room design)",
            Stage::Extraction => "🔍 Mining product data...",
        }
    }
}

/// Runs the design pipeline: generate a room image, then mine it for products.
///
/// Built once at startup and read-only afterwards. Without an API key the
/// decorator still exists but rejects every run.
pub struct Decorator {
    config: Config,
    services: Option<Services>,
}

impl Decorator {
    pub fn new(
        config: Config,
        generator: Arc<dyn ImageGenerator>,
        analyzer: Arc<dyn ImageAnalyzer>,
    ) -> Self {
        let services = Services {
            synthesis: ImageSynthesisInvoker::new(generator, config.image_model.clone()),
            extraction: ProductExtractor::new(analyzer, config.vision_model.clone()),
        };

        Self {
            config,
            services: Some(services),
        }
    }

    pub fn unconfigured(config: Config) -> Self {
        Self {
            config,
            services: None,
        }
    }

    /// Wires the Gemini HTTP clients when an API key is present.
    pub fn from_config(config: Config) -> Result<Self> {
        if !config.has_credentials() {
            log::debug!("GEMINI_API_KEY missing, generation is disabled");
            return Ok(Self::unconfigured(config));
        }

        let client = GeminiClient::new(&config.gemini)?;
        let generator: Arc<dyn ImageGenerator> = Arc::new(client.image().clone());
        let analyzer: Arc<dyn ImageAnalyzer> = Arc::new(client.vision().clone());
        Ok(Self::new(config, generator, analyzer))
    }

    pub fn is_configured(&self) -> bool {
        self.services.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rejects invalid requests before any external call. Once the request is
    /// accepted, generation and extraction failures end up in the outcome's
    /// notices instead of the `Err` branch.
    pub async fn run(&self, request: GenerationRequest) -> Result<DesignOutcome> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Like [`Decorator::run`], calling `on_stage` before each external call.
    pub async fn run_with_progress<F>(
        &self,
        request: GenerationRequest,
        mut on_stage: F,
    ) -> Result<DesignOutcome>
    where
        F: FnMut(Stage) + Send,
    {
        request.validate()?;

        let services = self.services.as_ref().ok_or_else(|| {
            DecorError::ConfigError(
                "API key missing. Set GEMINI_API_KEY to enable generation".into(),
            )
        })?;

        let mut outcome = DesignOutcome::new(&request);
        log::info!(
            "Run {} started: {} ({} mode)",
            outcome.run_id,
            request.style,
            request.mode
        );

        on_stage(Stage::Synthesis);
        let generated = {
            let _timer = logger::timer("image synthesis");
            services
                .synthesis
                .invoke(request.style, &request.notes, &mut outcome.notices)
                .await
        };

        let Some(generated) = generated else {
            outcome.source_image = request.source_image;
            return Ok(outcome);
        };

        on_stage(Stage::Extraction);
        let products = {
            let _timer = logger::timer("product extraction");
            services
                .extraction
                .extract(&generated, &mut outcome.notices)
                .await
        };

        outcome.source_image = request.source_image;
        outcome.generated = Some(generated);
        outcome.products = products;
        Ok(outcome)
    }
}

/// Everything one interaction produced. Dropped after rendering.
#[derive(Debug, Clone)]
pub struct DesignOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub style: Style,
    pub mode: DesignMode,
    pub source_image: Option<SourceImage>,
    pub generated: Option<GeneratedImage>,
    pub products: ProductList,
    pub notices: Notices,
}

impl DesignOutcome {
    fn new(request: &GenerationRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            style: request.style,
            mode: request.mode,
            source_image: None,
            generated: None,
            products: Vec::new(),
            notices: Notices::new(),
        }
    }

    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }

    /// Serializable view, image bytes left out.
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            style: self.style,
            mode: self.mode,
            source_image: self.source_image.as_ref().map(|image| {
                ImageSummary::describe(&image.bytes, &image.mime_type, image.path.clone())
            }),
            generated_image: self
                .generated
                .as_ref()
                .map(|image| ImageSummary::describe(&image.bytes, &image.mime_type, None)),
            products: self
                .products
                .iter()
                .map(|item| ProductCard {
                    name: item.name.clone(),
                    color: item.color.clone(),
                    query: item.query.clone(),
                    link: build_link(item),
                })
                .collect(),
            notices: self.notices.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub style: Style,
    pub mode: DesignMode,
    pub source_image: Option<ImageSummary>,
    pub generated_image: Option<ImageSummary>,
    pub products: Vec<ProductCard>,
    pub notices: Notices,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub mime_type: String,
    pub size_bytes: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub path: Option<PathBuf>,
}

impl ImageSummary {
    fn describe(bytes: &[u8], mime_type: &str, path: Option<PathBuf>) -> Self {
        let dimensions = crate::models::image_dimensions(bytes).ok();
        Self {
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub name: String,
    pub color: String,
    pub query: String,
    pub link: String,
}

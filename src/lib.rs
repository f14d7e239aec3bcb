pub mod config;
pub mod decorator;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod render;

pub use config::{Config, GeminiConfig};
pub use decorator::{
    build_link, Decorator, DesignOutcome, ImageSynthesisInvoker, Notice, NoticeLevel, Notices,
    ProductExtractor, Stage,
};
pub use error::{DecorError, Result};
pub use gemini::{GeminiClient, ImageAnalyzer, ImageClient, ImageGenerator, VisionClient};
pub use models::{
    DesignMode, GeneratedImage, GenerationRequest, ImageEntryPoint, ImageGenerationRequest,
    ProductItem, ProductList, SourceImage, Style, VisionRequest,
};

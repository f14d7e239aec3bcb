use crate::error::{DecorError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Room photo supplied by the user. Only JPEG and PNG are accepted.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub path: Option<PathBuf>,
}

impl SourceImage {
    pub const ACCEPTED_EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        if !Self::ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DecorError::ValidationError(format!(
                "Unsupported photo '{}'. Accepted types: {}",
                path.display(),
                Self::ACCEPTED_EXTENSIONS.join(", ")
            )));
        }

        let bytes = std::fs::read(path)?;
        let mut image = Self::from_bytes(bytes)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mime_type = match image::guess_format(&bytes)? {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            other => {
                return Err(DecorError::ValidationError(format!(
                    "Unsupported photo format: {:?}",
                    other
                )))
            }
        };

        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
            path: None,
        })
    }

    pub fn dimensions(&self) -> Result<(u32, u32)> {
        image_dimensions(&self.bytes)
    }
}

/// Decoded output of the image generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl GeneratedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decodes a base64 payload. When the service leaves out the MIME type it
    /// is sniffed from the bytes, falling back to PNG.
    pub fn from_base64(data: &str, mime_type: Option<&str>) -> Result<Self> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| DecorError::ResponseError(format!("Invalid base64 image: {}", e)))?;

        if bytes.is_empty() {
            return Err(DecorError::ResponseError("Empty image payload".into()));
        }

        let mime_type = match mime_type.filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_string(),
            None => image::guess_format(&bytes)
                .map(|format| format.to_mime_type().to_string())
                .unwrap_or_else(|_| "image/png".to_string()),
        };

        Ok(Self { bytes, mime_type })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    pub fn dimensions(&self) -> Result<(u32, u32)> {
        image_dimensions(&self.bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Arguments shared by every image generation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub number_of_images: u32,
}

/// Named operations on the image service that produce pictures from a prompt.
/// Different API versions expose one or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageEntryPoint {
    GenerateImages,
    Predict,
}

impl ImageEntryPoint {
    /// Probe order: the first entry point the service accepts wins.
    pub const PROBE_ORDER: [ImageEntryPoint; 2] =
        [ImageEntryPoint::GenerateImages, ImageEntryPoint::Predict];

    pub fn method_name(&self) -> &'static str {
        match self {
            ImageEntryPoint::GenerateImages => "generateImages",
            ImageEntryPoint::Predict => "predict",
        }
    }
}

impl fmt::Display for ImageEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

// Wire format of `models/{model}:generateImages`

#[derive(Debug, Serialize)]
pub struct GenerateImagesRequest {
    pub prompt: String,
    pub config: GenerateImagesConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesConfig {
    pub number_of_images: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesResponse {
    #[serde(default)]
    pub generated_images: Vec<GeneratedImageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImageEntry {
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub image_bytes: Option<String>,
    pub mime_type: Option<String>,
}

// Wire format of `models/{model}:predict`

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub sample_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}

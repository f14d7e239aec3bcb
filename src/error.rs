use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Interface mismatch: {0}")]
    InterfaceMismatch(String),
    #[error("Generation error: {0}")]
    GenerationError(String),
    #[error("Extraction error: {0}")]
    ExtractionError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Image error: {0}")]
    ImageError(String),
}

impl DecorError {
    /// True when the service rejected the call because the invoked operation
    /// does not exist on its side.
    pub fn is_interface_mismatch(&self) -> bool {
        matches!(self, DecorError::InterfaceMismatch(_))
    }
}

impl From<reqwest::Error> for DecorError {
    fn from(e: reqwest::Error) -> Self {
        DecorError::RequestError(e.to_string())
    }
}

impl From<serde_json::Error> for DecorError {
    fn from(e: serde_json::Error) -> Self {
        DecorError::SerializationError(e.to_string())
    }
}

impl From<image::ImageError> for DecorError {
    fn from(e: image::ImageError) -> Self {
        DecorError::ImageError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DecorError>;

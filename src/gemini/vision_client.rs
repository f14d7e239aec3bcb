use crate::{
    error::{DecorError, Result},
    gemini::{traits::ImageAnalyzer, Transport},
    models::{
        Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part, VisionRequest,
    },
};
use async_trait::async_trait;

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Clone)]
pub struct VisionClient {
    transport: Transport,
}

impl VisionClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn build_payload(request: &VisionRequest) -> GenerateContentRequest {
        // Image first, then the instruction.
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: request.mime_type.clone(),
                            data: request.image_base64.clone(),
                        }),
                        ..Default::default()
                    },
                    Part {
                        text: Some(request.instruction.clone()),
                        ..Default::default()
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, request: &VisionRequest) -> Result<String> {
        let url = self.transport.endpoint(&request.model, GENERATE_CONTENT);
        let payload = Self::build_payload(request);

        log::info!("Analyzing image with model {}", request.model);

        let response: GenerateContentResponse = self
            .transport
            .post_json(&url, &payload)
            .await?
            .json()
            .await
            .map_err(|e| DecorError::ResponseError(e.to_string()))?;

        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
        {
            log::debug!("Vision finish reason: {}", reason);
        }

        response
            .text()
            .ok_or_else(|| DecorError::ResponseError("Vision response contained no text".into()))
    }
}

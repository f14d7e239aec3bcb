use crate::{
    decorator::notices::Notices,
    error::{DecorError, Result},
    gemini::ImageAnalyzer,
    models::{GeneratedImage, ProductItem, ProductList, ProductRecord, VisionRequest},
};
use serde_json::Value;
use std::sync::Arc;

pub const EXTRACTION_PROMPT: &str = r#"Analyze this interior design image. Identify 5 distinct furniture or decor items visible.
Return the result as a JSON list.
Each item must have:
- "name": The name of the item (e.g., "Velvet Sofa")
- "color": The specific color/material
- "query": A precise Google Shopping search query

Return ONLY raw JSON. No markdown formatting."#;

const FENCE: &str = "```";

/// Removes a markdown code fence (with an optional `json` tag) around the
/// model's answer. Text that does not start with a fence is only trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest)
        .trim();

    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

/// Parses the model's answer into items. The answer must be a JSON array;
/// records missing a field, or carrying a blank or non-string one, are skipped.
pub fn parse_products(text: &str) -> Result<ProductList> {
    let cleaned = strip_code_fence(text);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| DecorError::ExtractionError(format!("Response is not valid JSON: {}", e)))?;

    let Value::Array(records) = value else {
        return Err(DecorError::ExtractionError(
            "Expected a JSON array of items".into(),
        ));
    };

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let parsed = serde_json::from_value::<ProductRecord>(record)
            .map_err(DecorError::from)
            .and_then(ProductItem::try_from);

        match parsed {
            Ok(item) => items.push(item),
            Err(e) => log::warn!("Skipping malformed product record #{}: {}", index, e),
        }
    }

    Ok(items)
}

/// Mines a generated design for shoppable items.
pub struct ProductExtractor {
    analyzer: Arc<dyn ImageAnalyzer>,
    model: String,
}

impl ProductExtractor {
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>, model: impl Into<String>) -> Self {
        Self {
            analyzer,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Never fails: problems become a warning on `notices` and an empty list.
    pub async fn extract(&self, image: &GeneratedImage, notices: &mut Notices) -> ProductList {
        match self.try_extract(image).await {
            Ok(items) => items,
            Err(e) => {
                notices.warn(format!("Could not extract products: {}", e));
                Vec::new()
            }
        }
    }

    pub async fn try_extract(&self, image: &GeneratedImage) -> Result<ProductList> {
        let request = VisionRequest {
            model: self.model.clone(),
            mime_type: image.mime_type.clone(),
            image_base64: image.to_base64(),
            instruction: EXTRACTION_PROMPT.to_string(),
        };

        let text = self.analyzer.analyze(&request).await?;
        log::debug!("Vision response: {}", text);

        let items = parse_products(&text)?;
        log::info!("Extracted {} product(s)", items.len());
        Ok(items)
    }
}

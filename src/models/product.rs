use crate::error::DecorError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A shoppable furniture or decor item spotted in a generated design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProductItem {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub query: String,
}

impl ProductItem {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            query: query.into(),
        }
    }

    pub fn shopping_link(&self) -> String {
        crate::decorator::links::build_link(self)
    }
}

/// Items in the order the model listed them.
pub type ProductList = Vec<ProductItem>;

/// One record of the model's JSON answer before validation. Every field is
/// optional so a single bad record can be skipped without failing the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub color: Option<String>,
    pub query: Option<String>,
}

impl TryFrom<ProductRecord> for ProductItem {
    type Error = DecorError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let field = |value: Option<String>, name: &str| {
            value
                .map(|v| v.trim().to_string())
                .ok_or_else(|| DecorError::ValidationError(format!("missing field '{}'", name)))
        };

        let item = ProductItem {
            name: field(record.name, "name")?,
            color: field(record.color, "color")?,
            query: field(record.query, "query")?,
        };

        item.validate()
            .map_err(|e| DecorError::ValidationError(e.to_string()))?;
        Ok(item)
    }
}

use crate::models::ProductItem;

pub const SHOPPING_SEARCH_URL: &str = "https://www.google.com/search";

/// Google Shopping search for the item's query. Only spaces are encoded
/// (as `+`); other URL-special characters pass through untouched.
pub fn build_link(item: &ProductItem) -> String {
    format!(
        "{}?q={}&tbm=shop",
        SHOPPING_SEARCH_URL,
        item.query.replace(' ', "+")
    )
}

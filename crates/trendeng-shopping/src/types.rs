//! Provider payloads. Field names follow the providers' camelCase JSON;
//! aliases cover the places where the two providers disagree.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One shopping search hit.
///
/// Serialized as-is into detail-fetch tasks, so everything the detail
/// fetcher needs must survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    #[serde(default)]
    pub title: Option<String>,
    /// Store label as shown by the search engine.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "productLink")]
    pub link: Option<String>,
    /// Display price, e.g. `"R$ 89,90"`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub extracted_price: Option<f64>,
    #[serde(default, alias = "imageUrl")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub product_id: Option<String>,
    #[serde(default, alias = "immersive_product_page_token")]
    pub immersive_product_page_token: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "ratingCount")]
    pub reviews: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub text: String,
}

/// A facet group such as "Price" or "Color".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "type", default)]
    pub filter_type: String,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

/// Normalized search response shared by all providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingResults {
    pub items: Vec<ShoppingItem>,
    pub filters: Vec<FilterGroup>,
}

impl ShoppingResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOffer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub extracted_price: Option<f64>,
    #[serde(default)]
    pub details_and_offers: Option<Value>,
}

/// The `productResult` block of an immersive product page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    #[serde(default, deserialize_with = "string_or_number")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<i64>,
    #[serde(default)]
    pub variants: Option<Value>,
    #[serde(default)]
    pub price_range: Option<Value>,
    #[serde(default)]
    pub thumbnails: Vec<String>,
    #[serde(default)]
    pub stores: Vec<StoreOffer>,
}

// Provider response envelopes.

#[derive(Debug, Deserialize)]
pub(crate) struct SerperShoppingResponse {
    #[serde(default)]
    pub shopping: Vec<ShoppingItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HasdataShoppingResponse {
    #[serde(default)]
    pub shopping_results: Vec<ShoppingItem>,
    #[serde(default)]
    pub filters: Vec<FilterGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HasdataImmersiveResponse {
    #[serde(default)]
    pub product_result: Option<ProductResult>,
}

/// Providers send ids and prices sometimes as strings, sometimes as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serper_item_uses_image_url_alias() {
        let item: ShoppingItem = serde_json::from_value(json!({
            "title": "Nike Air Max",
            "source": "Netshoes",
            "link": "https://shop.example/air-max",
            "price": "R$ 799,99",
            "imageUrl": "https://img.example/air.jpg",
            "rating": 4.6,
            "ratingCount": 210,
            "productId": 123456
        }))
        .unwrap();
        assert_eq!(item.thumbnail.as_deref(), Some("https://img.example/air.jpg"));
        assert_eq!(item.product_id.as_deref(), Some("123456"));
        assert_eq!(item.reviews, Some(210));
    }

    #[test]
    fn hasdata_item_keeps_page_token_through_round_trip() {
        let item: ShoppingItem = serde_json::from_value(json!({
            "title": "Vestido Midi",
            "source": "Farm Rio",
            "productLink": "https://shop.example/v",
            "extractedPrice": 199.9,
            "immersiveProductPageToken": "tok-1"
        }))
        .unwrap();
        let value = serde_json::to_value(&item).unwrap();
        let back: ShoppingItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
        assert_eq!(back.immersive_product_page_token.as_deref(), Some("tok-1"));
        assert_eq!(back.link.as_deref(), Some("https://shop.example/v"));
    }

    #[test]
    fn filter_group_reads_type_field() {
        let group: FilterGroup = serde_json::from_value(json!({
            "type": "Cor",
            "options": [{ "text": "Azul", "tbs": "x" }, { "text": "Preto" }]
        }))
        .unwrap();
        assert_eq!(group.filter_type, "Cor");
        assert_eq!(group.options.len(), 2);
    }
}

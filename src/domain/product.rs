//! Catalog entities. Prices are decimal BRL values; conversion to the
//! gateway's integer cents happens at the wire boundary.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<ProductVariation>,
}

/// A size or flavour option that overrides the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
}

impl Product {
    pub fn variation(&self, variation_id: &str) -> Option<&ProductVariation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }
}

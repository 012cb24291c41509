//! Cart state and totals.
//! Lines are keyed by product id plus variation id, mirroring how the
//! storefront merges repeated "add to cart" clicks on the same option.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductVariation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub variation: Option<ProductVariation>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CartItem {
    /// Unit price of the line: the selected variation's price when one
    /// was picked, the base product price otherwise.
    pub fn unit_price(&self) -> &BigDecimal {
        self.variation
            .as_ref()
            .map(|v| &v.price)
            .unwrap_or(&self.product.price)
    }

    pub fn line_total(&self) -> BigDecimal {
        self.unit_price() * BigDecimal::from(self.quantity)
    }

    fn matches(&self, product_id: &str, variation_id: Option<&str>) -> bool {
        self.product.id == product_id
            && self.variation.as_ref().map(|v| v.id.as_str()) == variation_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of a product, merging into an existing line when
    /// the same product and variation are already in the cart.
    pub fn add_item(&mut self, product: Product, quantity: u32, variation: Option<ProductVariation>) {
        if quantity == 0 {
            return;
        }

        let variation_id = variation.as_ref().map(|v| v.id.clone());
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.matches(&product.id, variation_id.as_deref()))
        {
            existing.quantity += quantity;
            return;
        }

        self.items.push(CartItem {
            product,
            quantity,
            variation,
            notes: None,
        });
    }

    pub fn remove_item(&mut self, product_id: &str, variation_id: Option<&str>) {
        self.items
            .retain(|item| !item.matches(product_id, variation_id));
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, variation_id: Option<&str>, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, variation_id);
            return;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product_id, variation_id))
        {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).expect("valid decimal")
    }

    fn burger() -> Product {
        Product {
            id: "burger-1".to_string(),
            name: "Smash Clássico".to_string(),
            description: String::new(),
            price: decimal("24.90"),
            category: "Burgers".to_string(),
            image_url: None,
            variations: vec![],
        }
    }

    fn marmita() -> Product {
        Product {
            id: "marmita-1".to_string(),
            name: "Marmita Fit".to_string(),
            description: String::new(),
            price: decimal("19.90"),
            category: "Marmitas".to_string(),
            image_url: None,
            variations: vec![
                ProductVariation {
                    id: "marmita-1-p".to_string(),
                    name: "Pequena".to_string(),
                    price: decimal("16.90"),
                },
                ProductVariation {
                    id: "marmita-1-g".to_string(),
                    name: "Grande".to_string(),
                    price: decimal("22.90"),
                },
            ],
        }
    }

    #[test]
    fn merges_repeated_adds_of_the_same_line() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 1, None);
        cart.add_item(burger(), 2, None);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn tracks_variations_as_separate_lines() {
        let product = marmita();
        let small = product.variation("marmita-1-p").cloned();
        let large = product.variation("marmita-1-g").cloned();

        let mut cart = Cart::new();
        cart.add_item(product.clone(), 1, small.clone());
        cart.add_item(product.clone(), 1, large);
        cart.add_item(product, 1, small);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn variation_price_wins_over_base_price() {
        let product = marmita();
        let large = product.variation("marmita-1-g").cloned();

        let mut cart = Cart::new();
        cart.add_item(product, 2, large);

        assert_eq!(cart.subtotal(), decimal("45.80"));
    }

    #[test]
    fn update_quantity_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 2, None);
        cart.update_quantity("burger-1", None, 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_replaces_rather_than_accumulates() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 2, None);
        cart.update_quantity("burger-1", None, 5);

        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn adding_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 0, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn subtotal_sums_mixed_lines() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 1, None);
        let product = marmita();
        let small = product.variation("marmita-1-p").cloned();
        cart.add_item(product, 2, small);

        assert_eq!(cart.subtotal(), decimal("58.70"));
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 1, None);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), BigDecimal::from(0));
    }
}

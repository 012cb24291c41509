//! Order entity assembled at checkout time.
//! An Order is the immutable input to transaction creation; totals are
//! fixed when it is built from the cart and validated again before any
//! network call.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::coupon::Coupon;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    pub subtotal: BigDecimal,
    pub discount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub address: Address,
    pub customer: Customer,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from the current cart. The coupon discount is
    /// resolved against the cart subtotal; `delivery_fee` comes from the
    /// store profile (already zeroed when a free-delivery threshold was
    /// met).
    pub fn from_cart(
        cart: &Cart,
        address: Address,
        customer: Customer,
        coupon: Option<&Coupon>,
        delivery_fee: BigDecimal,
    ) -> Self {
        let subtotal = cart.subtotal();
        let discount = coupon
            .map(|c| c.discount_for(&subtotal))
            .unwrap_or_else(|| BigDecimal::from(0));
        let total = &subtotal - &discount + &delivery_fee;

        Self {
            id: Uuid::new_v4(),
            items: cart.items.clone(),
            subtotal,
            discount,
            delivery_fee,
            total,
            address,
            customer,
            placed_at: Utc::now(),
        }
    }

    /// Reference sent to the gateway to tie the charge back to this order.
    pub fn external_reference(&self) -> String {
        format!("PEDIDO-{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Product;
    use std::str::FromStr;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).expect("valid decimal")
    }

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            price: decimal(price),
            category: "Pratos".to_string(),
            image_url: None,
            variations: vec![],
        }
    }

    fn address() -> Address {
        Address {
            cep: "85850-000".to_string(),
            street: "Avenida Brasil".to_string(),
            number: "1500".to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            city: "Foz do Iguaçu".to_string(),
            state: "PR".to_string(),
        }
    }

    fn customer() -> Customer {
        Customer {
            name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            phone: "(45) 99999-1234".to_string(),
            cpf: Some("123.456.789-01".to_string()),
        }
    }

    #[test]
    fn totals_reconcile_without_coupon_or_fee() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "45.90"), 1, None);

        let order = Order::from_cart(&cart, address(), customer(), None, BigDecimal::from(0));

        assert_eq!(order.subtotal, decimal("45.90"));
        assert_eq!(order.discount, BigDecimal::from(0));
        assert_eq!(order.total, decimal("45.90"));
    }

    #[test]
    fn totals_fold_in_discount_and_delivery_fee() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", "50.00"), 2, None);

        let coupon = Coupon::percentage("BEMVINDO20", 20);
        let order = Order::from_cart(&cart, address(), customer(), Some(&coupon), decimal("8.90"));

        assert_eq!(order.subtotal, decimal("100.00"));
        assert_eq!(order.discount, decimal("20.00"));
        assert_eq!(order.delivery_fee, decimal("8.90"));
        assert_eq!(order.total, decimal("88.90"));
    }

    #[test]
    fn external_reference_carries_the_order_id() {
        let cart = Cart::new();
        let order = Order::from_cart(&cart, address(), customer(), None, BigDecimal::from(0));

        assert_eq!(order.external_reference(), format!("PEDIDO-{}", order.id));
    }
}

//! Wire shapes for the PIX gateway.
//! Requests carry amounts in integer centavos and digits-only contact
//! fields; responses are parsed with every field optional so a partial
//! payload surfaces as a gateway error instead of a deserialization
//! failure.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::error::PaymentError;
use crate::utils::digits::digits_only;
use crate::validation::{sanitize_string, ValidationError};

/// Converts a decimal BRL amount into integer centavos.
pub fn to_cents(amount: &BigDecimal) -> Option<i64> {
    (amount * BigDecimal::from(100)).round(0).to_i64()
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub items: Vec<LineItem>,
    pub customer: CustomerPayload,
    pub shipping: ShippingPayload,
    pub pix: PixOptions,
    pub external_reference: String,
    pub metadata: RequestMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub tangible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingPayload {
    pub name: String,
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PixOptions {
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMetadata {
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
}

impl CreateTransactionRequest {
    /// Serializes a validated order into the gateway shape. Amounts are
    /// converted to centavos here and nowhere else.
    pub fn from_order(
        order: &Order,
        currency: &str,
        expires_in_secs: u32,
    ) -> Result<Self, PaymentError> {
        let amount = to_cents(&order.total).ok_or_else(|| amount_out_of_range("total"))?;

        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(LineItem {
                    title: sanitize_string(&item.product.name),
                    quantity: item.quantity,
                    unit_price: to_cents(item.unit_price())
                        .ok_or_else(|| amount_out_of_range("items"))?,
                    tangible: true,
                })
            })
            .collect::<Result<Vec<_>, PaymentError>>()?;

        let customer = &order.customer;
        let address = &order.address;

        Ok(CreateTransactionRequest {
            amount,
            currency: currency.to_string(),
            payment_method: "pix".to_string(),
            items,
            customer: CustomerPayload {
                name: sanitize_string(&customer.name),
                email: customer.email.trim().to_string(),
                phone: digits_only(&customer.phone),
                document: customer.cpf.as_deref().map(|cpf| DocumentPayload {
                    kind: "cpf".to_string(),
                    number: digits_only(cpf),
                }),
            },
            shipping: ShippingPayload {
                name: sanitize_string(&customer.name),
                street: sanitize_string(&address.street),
                number: sanitize_string(&address.number),
                complement: address
                    .complement
                    .as_deref()
                    .map(sanitize_string)
                    .filter(|c| !c.is_empty()),
                neighborhood: sanitize_string(&address.neighborhood),
                city: sanitize_string(&address.city),
                state: sanitize_string(&address.state),
                zip_code: digits_only(&address.cep),
            },
            pix: PixOptions {
                expires_in: u64::from(expires_in_secs),
            },
            external_reference: order.external_reference(),
            metadata: RequestMetadata {
                order_id: order.id.to_string(),
                timestamp: Utc::now(),
            },
        })
    }
}

fn amount_out_of_range(field: &'static str) -> PaymentError {
    PaymentError::InvalidInput(ValidationError::new(field, "amount out of supported range"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub pix: Option<PixPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PixPayload {
    pub qr_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub pix_key: Option<String>,
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub paid_at: Option<String>,
}

/// Lenient RFC 3339 parse for gateway timestamps.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

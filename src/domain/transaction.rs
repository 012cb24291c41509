//! PIX transaction entity.
//! Gateway-agnostic representation of one charge attempt; only `status`
//! changes after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
}

impl TransactionStatus {
    /// Maps a raw gateway status string. Unknown values stay `Pending`
    /// so a gateway quirk can never surface a false success.
    pub fn from_gateway(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" | "approved" => TransactionStatus::Paid,
            "cancelled" | "canceled" | "declined" | "refunded" => TransactionStatus::Cancelled,
            "expired" => TransactionStatus::Expired,
            _ => TransactionStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One PIX charge for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Gateway-assigned identifier.
    pub id: String,
    pub order_id: Uuid,
    /// Charged amount in minor units (centavos).
    pub amount_cents: i64,
    /// The copy-paste PIX code the payer pastes into their banking app.
    pub pix_key: String,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Point-in-time view of a transaction as reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub amount_cents: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
}

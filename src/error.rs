use thiserror::Error;

use crate::validation::ValidationError;

/// Errors produced while creating or polling a PIX transaction.
///
/// `InvalidInput` is always raised before any network traffic; `Gateway`
/// covers non-2xx and malformed gateway responses; `Network` covers
/// transport failures where no usable response arrived.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid order: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PaymentError {
    pub fn gateway(status: u16, message: impl Into<String>) -> Self {
        PaymentError::Gateway {
            status,
            message: message.into(),
        }
    }

    /// True for failures that polling is allowed to absorb up to its
    /// attempt cap. Validation failures are never retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PaymentError::InvalidInput(_))
    }
}

/// Terminal reasons a payment watch reports through its failure callback.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalFailure {
    #[error("Payment was cancelled or declined")]
    Cancelled,

    #[error("Timed out waiting for payment confirmation")]
    Timeout,

    #[error("Payment window expired")]
    Expired,
}

impl TerminalFailure {
    pub fn reason_code(&self) -> &'static str {
        match self {
            TerminalFailure::Cancelled => "cancelled",
            TerminalFailure::Timeout => "timeout",
            TerminalFailure::Expired => "expired",
        }
    }
}

/// Errors from the postal-code and reverse-geocoding lookups.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Invalid CEP: {0}")]
    InvalidCep(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed lookup response: {0}")]
    Malformed(String),
}

/// Errors from the session persistence layer.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Corrupt session payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{PollPolicy, StorefrontConfig};
use crate::domain::order::Order;
use crate::domain::transaction::{StatusSnapshot, Transaction, TransactionStatus};
use crate::error::{PaymentError, TerminalFailure};
use crate::gateway::client::GatewayClient;
use crate::gateway::wire::{self, CreateTransactionRequest, CreateTransactionResponse};
use crate::services::watch::{
    run_watch, system_clock, Clock, StatusSource, WatchCallbacks, WatchHandle,
};
use crate::validation::validate_order;

/// Front door for the PIX payment lifecycle: validates an order,
/// creates the charge, answers one-shot status checks and spawns
/// background watches.
#[derive(Clone)]
pub struct PaymentCoordinator {
    gateway: Arc<GatewayClient>,
    policy: PollPolicy,
    currency: String,
    pix_expiry_secs: u32,
    clock: Clock,
}

impl PaymentCoordinator {
    pub fn from_config(config: &StorefrontConfig) -> Self {
        PaymentCoordinator {
            gateway: Arc::new(GatewayClient::new(config.gateway.clone())),
            policy: config.polling,
            currency: config.currency.clone(),
            pix_expiry_secs: config.gateway.pix_expiry_secs,
            clock: system_clock(),
        }
    }

    /// Replaces the wall clock. Lets tests drive expiry deterministically.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the order and creates a PIX charge for it.
    ///
    /// An invalid order never reaches the network.
    pub async fn create(&self, order: &Order) -> Result<Transaction, PaymentError> {
        validate_order(order)?;

        let request =
            CreateTransactionRequest::from_order(order, &self.currency, self.pix_expiry_secs)?;
        let response = self.gateway.create_transaction(&request).await?;

        let transaction = assemble_transaction(
            order.id,
            request.amount,
            response,
            (self.clock)(),
            self.pix_expiry_secs,
        )?;

        info!(
            transaction_id = %transaction.id,
            order_id = %transaction.order_id,
            amount_cents = transaction.amount_cents,
            "Created PIX transaction"
        );

        Ok(transaction)
    }

    /// One-shot status check.
    pub async fn poll_status(&self, transaction_id: &str) -> Result<StatusSnapshot, PaymentError> {
        self.gateway.poll_status(transaction_id).await
    }

    /// Spawns a background watch that polls until the charge settles,
    /// then fires exactly one of the two callbacks.
    pub fn watch<P, F>(&self, transaction: &Transaction, on_paid: P, on_failure: F) -> WatchHandle
    where
        P: FnOnce(StatusSnapshot) + Send + 'static,
        F: FnOnce(TerminalFailure) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());
        let callbacks = WatchCallbacks {
            on_paid: Some(Box::new(on_paid)),
            on_failure: Some(Box::new(on_failure)),
        };

        let task = tokio::spawn(run_watch(
            Arc::clone(&self.gateway) as Arc<dyn StatusSource>,
            transaction.clone(),
            self.policy,
            Arc::clone(&self.clock),
            Arc::clone(&cancelled),
            Arc::clone(&notify),
            callbacks,
        ));

        WatchHandle::new(cancelled, notify, task)
    }
}

/// Builds the domain transaction out of a create response, filling the
/// gaps tolerated on the wire. The charge is unusable without an id and
/// a PIX key, so those stay hard errors.
fn assemble_transaction(
    order_id: Uuid,
    requested_cents: i64,
    response: CreateTransactionResponse,
    now: DateTime<Utc>,
    fallback_expiry_secs: u32,
) -> Result<Transaction, PaymentError> {
    let id = response
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| PaymentError::gateway(200, "gateway response missing transaction id"))?;

    let pix = response
        .pix
        .ok_or_else(|| PaymentError::gateway(200, "gateway response missing pix payload"))?;

    let pix_key = pix
        .pix_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| PaymentError::gateway(200, "gateway response missing pix key"))?;

    let expires_at = match pix.expires_at.as_deref().and_then(wire::parse_timestamp) {
        Some(expires_at) => expires_at,
        None => {
            warn!(transaction_id = %id, "Gateway omitted expiry; using configured PIX window");
            now + Duration::seconds(i64::from(fallback_expiry_secs))
        }
    };

    Ok(Transaction {
        id,
        order_id,
        amount_cents: response.amount.unwrap_or(requested_cents),
        pix_key,
        qr_code: pix.qr_code,
        qr_code_url: pix.qr_code_url,
        status: response
            .status
            .as_deref()
            .map(TransactionStatus::from_gateway)
            .unwrap_or(TransactionStatus::Pending),
        created_at: now,
        expires_at,
    })
}

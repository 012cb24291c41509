pub mod client;
pub mod wire;

pub use client::GatewayClient;
pub use wire::{CreateTransactionRequest, CreateTransactionResponse, StatusResponse};

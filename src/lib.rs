//! Storefront checkout and PIX payment engine for the Pedido
//! food-delivery stores. Holds the cart/checkout/location state, talks
//! to the payment gateway and the address lookup services, and drives
//! the payment status watch; rendering is the host application's job.

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod lookup;
pub mod services;
pub mod session;
pub mod utils;
pub mod validation;

pub use config::StorefrontConfig;
pub use domain::{Cart, CartItem, Coupon, CouponBook, Order, Transaction, TransactionStatus};
pub use error::{LookupError, PaymentError, SessionError, TerminalFailure};
pub use services::{PaymentCoordinator, WatchHandle, WatchState};
pub use session::StorefrontSession;

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod transaction;

pub use cart::{Cart, CartItem};
pub use coupon::{Coupon, CouponBook, Discount};
pub use order::{Address, Customer, Order};
pub use product::{Product, ProductVariation};
pub use transaction::{StatusSnapshot, Transaction, TransactionStatus};

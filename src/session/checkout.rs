use serde::{Deserialize, Serialize};

use crate::domain::order::{Address, Customer};

/// Where the shopper is in the four-step checkout flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    #[default]
    Address,
    Customer,
    Coupon,
    Review,
}

/// Checkout form state that survives a reload. Each setter records its
/// step's data and moves the flow to the next step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutProgress {
    #[serde(default)]
    pub step: CheckoutStep,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl CheckoutProgress {
    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
        self.step = CheckoutStep::Customer;
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = Some(customer);
        self.step = CheckoutStep::Coupon;
    }

    /// Records the applied coupon, or `None` when the shopper skips the
    /// step.
    pub fn set_coupon(&mut self, code: Option<String>) {
        self.coupon_code = code;
        self.step = CheckoutStep::Review;
    }

    /// True once every step that payment needs has been filled in.
    pub fn ready_for_payment(&self) -> bool {
        self.step == CheckoutStep::Review && self.address.is_some() && self.customer.is_some()
    }

    pub fn reset(&mut self) {
        *self = CheckoutProgress::default();
    }
}

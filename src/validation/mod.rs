use bigdecimal::BigDecimal;
use std::fmt;

use crate::domain::order::Order;
use crate::utils::digits::digits_only;

pub const CEP_LEN: usize = 8;
pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 11;
pub const CPF_LEN: usize = 11;
pub const STATE_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 120;
pub const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_cep(field: &'static str, cep: &str) -> ValidationResult {
    if digits_only(cep).len() != CEP_LEN {
        return Err(ValidationError::new(
            field,
            format!("must have exactly {} digits", CEP_LEN),
        ));
    }

    Ok(())
}

pub fn validate_phone(field: &'static str, phone: &str) -> ValidationResult {
    let len = digits_only(phone).len();
    if len < PHONE_MIN_LEN || len > PHONE_MAX_LEN {
        return Err(ValidationError::new(
            field,
            format!("must have {} to {} digits", PHONE_MIN_LEN, PHONE_MAX_LEN),
        ));
    }

    Ok(())
}

pub fn validate_cpf(field: &'static str, cpf: &str) -> ValidationResult {
    if digits_only(cpf).len() != CPF_LEN {
        return Err(ValidationError::new(
            field,
            format!("must have exactly {} digits", CPF_LEN),
        ));
    }

    Ok(())
}

pub fn validate_email(field: &'static str, email: &str) -> ValidationResult {
    let email = sanitize_string(email);
    validate_required(field, &email)?;
    validate_max_len(field, &email, EMAIL_MAX_LEN)?;

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::new(field, "must be a valid email address"));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_non_negative_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount < &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

/// Rejects amounts with sub-cent precision; the gateway only accepts
/// whole centavos.
pub fn validate_cent_precision(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if *amount != amount.with_scale(2) {
        return Err(ValidationError::new(
            field,
            "must not have more than two decimal places",
        ));
    }

    Ok(())
}

/// Full pre-flight check run before any gateway call. The first failing
/// field is reported; nothing is sent over the network on failure.
pub fn validate_order(order: &Order) -> ValidationResult {
    if order.items.is_empty() {
        return Err(ValidationError::new(
            "items",
            "must contain at least one item",
        ));
    }

    for item in &order.items {
        if item.quantity == 0 {
            return Err(ValidationError::new(
                "items",
                "quantities must be greater than zero",
            ));
        }
        validate_positive_amount("items", item.unit_price())?;
    }

    validate_positive_amount("total", &order.total)?;
    validate_cent_precision("total", &order.total)?;
    validate_non_negative_amount("discount", &order.discount)?;
    validate_non_negative_amount("delivery_fee", &order.delivery_fee)?;

    let line_sum = order
        .items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());
    if line_sum != order.subtotal {
        return Err(ValidationError::new(
            "subtotal",
            "does not match the sum of line items",
        ));
    }

    if order.discount > order.subtotal {
        return Err(ValidationError::new(
            "discount",
            "must not exceed the subtotal",
        ));
    }

    if &order.subtotal - &order.discount + &order.delivery_fee != order.total {
        return Err(ValidationError::new(
            "total",
            "does not reconcile with subtotal, discount and delivery fee",
        ));
    }

    let name = sanitize_string(&order.customer.name);
    validate_required("customer.name", &name)?;
    validate_max_len("customer.name", &name, NAME_MAX_LEN)?;
    validate_email("customer.email", &order.customer.email)?;
    validate_phone("customer.phone", &order.customer.phone)?;
    if let Some(cpf) = &order.customer.cpf {
        validate_cpf("customer.cpf", cpf)?;
    }

    validate_cep("address.cep", &order.address.cep)?;
    validate_required("address.street", &order.address.street)?;
    validate_required("address.number", &order.address.number)?;
    validate_required("address.neighborhood", &order.address.neighborhood)?;
    validate_required("address.city", &order.address.city)?;
    if sanitize_string(&order.address.state).len() != STATE_LEN {
        return Err(ValidationError::new(
            "address.state",
            format!("must be a {}-letter state code", STATE_LEN),
        ));
    }

    Ok(())
}

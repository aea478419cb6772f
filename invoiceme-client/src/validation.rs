//! Advisory form validation.
//!
//! The backend stays authoritative; these checks only give the user
//! immediate feedback before a form is submitted. Request bodies in
//! [`crate::models`] derive [`Validate`] with the rules below.

use crate::error::ClientError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Run a form's rules, surfacing failures as [`ClientError::Validation`].
pub fn check<T: Validate>(form: &T) -> Result<(), ClientError> {
    form.validate().map_err(ClientError::Validation)
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub(crate) fn required_id(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(failure("required", "This field is required"));
    }
    Ok(())
}

pub(crate) fn quantity_at_least_one(quantity: &Decimal) -> Result<(), ValidationError> {
    if *quantity < Decimal::ONE {
        return Err(failure("range", "Quantity must be at least 1"));
    }
    Ok(())
}

pub(crate) fn non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(failure("range", "Unit price must be positive"));
    }
    Ok(())
}

pub(crate) fn payment_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::new(1, 2) {
        return Err(failure("range", "Payment amount must be greater than 0"));
    }
    Ok(())
}

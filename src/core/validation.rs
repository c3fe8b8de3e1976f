//! Input validation shared by every write path.
//!
//! All amounts, limits, names and descriptions pass through these functions
//! before anything is written, so the rules live in one place.

use crate::errors::{Error, Result};

/// Maximum transaction description length, in characters
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Maximum category, debt and savings goal name length, in characters
pub const MAX_NAME_LEN: usize = 50;

/// Accepts strictly positive, finite amounts.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Accepts zero or positive finite amounts (budget limits, balances, income).
pub fn validate_non_negative(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Trims a description and checks its length. Empty descriptions are allowed.
pub fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    let len = trimmed.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(Error::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Trims a display name and checks it is non-empty and short enough.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName {
            reason: "name cannot be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(Error::InvalidName {
            reason: format!("name must be at most {MAX_NAME_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Replaces NaN and infinities with zero so aggregate totals stay defined.
#[must_use]
pub const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

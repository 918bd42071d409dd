//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied
//! at the API boundary.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: seat names, order line names, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: branch IDs, session IDs, seat IDs
pub const MAX_ID_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite and non-negative.
pub fn validate_money(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate a tax percentage lies in [0, 100].
pub fn validate_percent(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rejects_negative_and_non_finite() {
        assert!(validate_money(0.0, "discount").is_ok());
        assert!(validate_money(99.99, "discount").is_ok());
        assert!(validate_money(-1.0, "discount").is_err());
        assert!(validate_money(f64::NAN, "discount").is_err());
        assert!(validate_money(f64::INFINITY, "discount").is_err());
    }

    #[test]
    fn percent_rejects_values_outside_range() {
        assert!(validate_percent(0.0, "tax_percent").is_ok());
        assert!(validate_percent(18.0, "tax_percent").is_ok());
        assert!(validate_percent(100.0, "tax_percent").is_ok());
        assert!(validate_percent(-0.1, "tax_percent").is_err());
        assert!(validate_percent(100.1, "tax_percent").is_err());
        assert!(validate_percent(f64::NAN, "tax_percent").is_err());
    }

    #[test]
    fn required_text_rejects_blank_and_oversized() {
        assert!(validate_required_text("b1", "branch_id", MAX_ID_LEN).is_ok());
        assert!(validate_required_text("   ", "branch_id", MAX_ID_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(MAX_ID_LEN + 1), "branch_id", MAX_ID_LEN).is_err());
    }
}

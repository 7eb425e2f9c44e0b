//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on reasonable UX limits for names and notes;
//! the document store has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Flavor / topping display names
pub const MAX_NAME_LEN: usize = 100;

/// Special instructions (free text from the customer)
pub const MAX_INSTRUCTIONS_LEN: usize = 500;

/// Opaque actor / customer references supplied by the auth layer
pub const MAX_REF_LEN: usize = 100;

/// Redemption codes are exactly this many characters
pub const CODE_LEN: usize = 5;

// ── Validation helpers (handlers) ───────────────────────────────────

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

/// Validate the shape of a redemption code: exactly [`CODE_LEN`] ASCII
/// alphanumeric characters. Case is normalized later, not rejected here.
pub fn validate_code_shape(code: &str) -> Result<(), AppError> {
    let trimmed = code.trim();
    if trimmed.len() != CODE_LEN || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::validation(format!(
            "Code must be {CODE_LEN} alphanumeric characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_empty() {
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("taro", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text_accepts_none() {
        assert!(validate_optional_text(&None, "note", MAX_INSTRUCTIONS_LEN).is_ok());
    }

    #[test]
    fn test_code_shape() {
        assert!(validate_code_shape("AB12C").is_ok());
        assert!(validate_code_shape("ab12c").is_ok()); // lowercase normalized later
        assert!(validate_code_shape(" AB12C ").is_ok()); // surrounding whitespace trimmed
        assert!(validate_code_shape("AB12").is_err()); // too short
        assert!(validate_code_shape("AB12CD").is_err()); // too long
        assert!(validate_code_shape("AB-2C").is_err()); // non-alphanumeric
    }
}

/// Request field validation
///
/// Custom rules for the `validator` derive plus a helper that surfaces
/// the first failing rule as a client-facing error.
use crate::error::{AuthError, AuthResult};
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Display names must have at least 5 characters after trimming
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < 5 {
        return Err(rule_error(
            "name",
            "Name must be at least 5 characters long!",
        ));
    }
    Ok(())
}

/// Mobile numbers are exactly ten digits
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.len() != 10 || !mobile.bytes().all(|b| b.is_ascii_digit()) {
        return Err(rule_error("mobile", "Invalid mobile number!"));
    }
    Ok(())
}

/// Passwords must have at least 8 characters after trimming
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().chars().count() < 8 {
        return Err(rule_error(
            "password",
            "Password must be at least 8 characters long!",
        ));
    }
    Ok(())
}

/// Format check for optional identifier fields; empty counts as absent
pub fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if !email.is_empty() && !email.validate_email() {
        return Err(rule_error("email", "Invalid email!"));
    }
    Ok(())
}

/// Format check for optional identifier fields; empty counts as absent
pub fn validate_optional_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.is_empty() {
        return Ok(());
    }
    validate_mobile(mobile)
}

/// Run derive-based validation and map the first failure to a 400 error
pub fn check<T: Validate>(value: &T) -> AuthResult<()> {
    value
        .validate()
        .map_err(|e| AuthError::Validation(first_message(&e)))
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid request body!".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_requires_five_trimmed_characters() {
        assert!(validate_name("Jordan").is_ok());
        assert!(validate_name("  Jo  ").is_err());
        assert!(validate_name("   Jordan   ").is_ok());
    }

    #[test]
    fn test_mobile_requires_ten_digits() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("987654321").is_err());
        assert!(validate_mobile("98765432100").is_err());
        assert!(validate_mobile("98765abc10").is_err());
    }

    #[test]
    fn test_password_requires_eight_trimmed_characters() {
        assert!(validate_password("hunter22").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("  pass1  ").is_err());
    }

    #[test]
    fn test_rule_errors_carry_their_message() {
        let err = validate_mobile("123").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Invalid mobile number!"));
    }

    #[test]
    fn test_optional_fields_treat_empty_as_absent() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("jordan@example.com").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());

        assert!(validate_optional_mobile("").is_ok());
        assert!(validate_optional_mobile("9876543210").is_ok());
        assert!(validate_optional_mobile("123").is_err());
    }
}

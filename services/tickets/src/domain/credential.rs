//! Email and password rules applied at registration and login.

use crate::error::TicketingError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim and lower-case an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), TicketingError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(TicketingError::InvalidEmail);
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(TicketingError::InvalidEmail);
    }
    Ok(())
}

/// At least 8 characters with one lower-case letter, one upper-case letter,
/// one digit and one character that is neither letter nor digit.
pub fn validate_password(password: &str) -> Result<(), TicketingError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if long_enough && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(TicketingError::WeakPassword)
    }
}

//! Input validation helpers
//!
//! Everything here runs before a request is built; a failure never reaches
//! the network.

use crate::error::PosError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, brand, supplier, customer names
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Phone digit count bounds
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), PosError> {
    if value.trim().is_empty() {
        return Err(PosError::validation(format!("{field} es obligatorio")));
    }
    if value.chars().count() > max_len {
        return Err(PosError::validation(format!(
            "{field} es demasiado largo (máximo {max_len} caracteres)"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), PosError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(PosError::validation(format!(
            "{field} es demasiado largo (máximo {max_len} caracteres)"
        )));
    }
    Ok(())
}

// ── Contact data ────────────────────────────────────────────────────

/// `local@domain.tld`, no whitespace, one `@`
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}

pub fn validate_email(email: &str) -> Result<(), PosError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(PosError::validation("El correo electrónico no es válido"))
    }
}

/// Digits, spaces, `+`, `-` and parentheses; 7 to 15 digits
pub fn is_valid_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    allowed && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

pub fn validate_phone(phone: &str) -> Result<(), PosError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(PosError::validation("El teléfono no es válido"))
    }
}

/// Non-blank optional value, trimmed
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Lápices", "Nombre", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "Nombre", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("abcdef", "Nombre", 5).is_err());
        // length counts characters, not bytes
        assert!(validate_required_text("ñññññ", "Nombre", 5).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("ana@cemac.mx"));
        assert!(is_valid_email(" ana.lopez@correo.com.mx "));
        assert!(!is_valid_email("ana@cemac"));
        assert!(!is_valid_email("ana cemac@x.mx"));
        assert!(!is_valid_email("@cemac.mx"));
        assert!(!is_valid_email("a@b@c.mx"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("55 1234 5678"));
        assert!(is_valid_phone("+52 (55) 1234-5678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("55-1234-abcd"));
        assert!(!is_valid_phone("1234567890123456"));
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid regex"));
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_]{3,30}$").expect("valid regex"));
static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid regex"));

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("username must be 3-30 characters of lowercase letters, digits or underscore")]
    InvalidUsername,
    #[error("password must be between 8 and 72 characters")]
    PasswordLength,
    #[error("password must contain an uppercase letter, a lowercase letter and a digit")]
    PasswordTooWeak,
    #[error("password must not contain the username")]
    PasswordContainsUsername,
    #[error("pin must be exactly 6 digits")]
    InvalidPin,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), CredentialError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CredentialError::InvalidEmail)
    }
}

pub fn validate_username(username: &str) -> Result<(), CredentialError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(CredentialError::InvalidUsername)
    }
}

pub fn validate_password(password: &str, username: &str) -> Result<(), CredentialError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(CredentialError::PasswordLength);
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(CredentialError::PasswordTooWeak);
    }
    if !username.is_empty() && password.to_lowercase().contains(&username.to_lowercase()) {
        return Err(CredentialError::PasswordContainsUsername);
    }
    Ok(())
}

pub fn validate_pin(pin: &str) -> Result<(), CredentialError> {
    if PIN_RE.is_match(pin) {
        Ok(())
    } else {
        Err(CredentialError::InvalidPin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(validate_email("buyer@example.com").is_ok());
        assert_eq!(validate_email("buyer@example"), Err(CredentialError::InvalidEmail));
        assert_eq!(validate_email("no-at-sign.com"), Err(CredentialError::InvalidEmail));
        assert_eq!(normalize_email("  Buyer@Example.COM "), "buyer@example.com");
    }

    #[test]
    fn username_shapes() {
        assert!(validate_username("seller_01").is_ok());
        assert_eq!(validate_username("ab"), Err(CredentialError::InvalidUsername));
        assert_eq!(validate_username("Upper"), Err(CredentialError::InvalidUsername));
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Sup3rSecret", "buyer").is_ok());
        assert_eq!(validate_password("Ab1", "buyer"), Err(CredentialError::PasswordLength));
        assert_eq!(
            validate_password("alllowercase1", "buyer"),
            Err(CredentialError::PasswordTooWeak)
        );
        assert_eq!(
            validate_password("MyBuyer2024", "buyer"),
            Err(CredentialError::PasswordContainsUsername)
        );
    }

    #[test]
    fn pin_is_six_digits() {
        assert!(validate_pin("123456").is_ok());
        assert_eq!(validate_pin("12345"), Err(CredentialError::InvalidPin));
        assert_eq!(validate_pin("12345a"), Err(CredentialError::InvalidPin));
    }
}

//! Input validation for account credentials.

use std::sync::OnceLock;

use regex::Regex;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex is valid")
    })
}

pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Password policy: at least 8 characters with one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails_accepted() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn test_invalid_emails_rejected() {
        assert!(!validate_email(""));
        assert!(!validate_email("plainaddress"));
        assert!(!validate_email("missing@tld"));
        assert!(!validate_email("@no-local.com"));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("abcd1234").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("abcdefgh").is_err());
    }
}

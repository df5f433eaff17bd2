use crate::error::ValidationError;
use std::fmt;

/// Email trimmed of surrounding whitespace and lowercased. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Password kept exactly as given; blank input is rejected.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Keep the value out of logs.
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = NormalizedEmail::parse("  Alice@Example.COM \t").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn blank_email_is_rejected() {
        assert_eq!(
            NormalizedEmail::parse("   "),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn password_is_kept_verbatim() {
        let pw = Password::parse(" s3cret ").unwrap();
        assert_eq!(pw.as_str(), " s3cret ");
        assert_eq!(format!("{pw:?}"), "Password(***)");
    }

    #[test]
    fn blank_password_is_rejected() {
        assert_eq!(Password::parse(" \n"), Err(ValidationError::MissingPassword));
    }
}

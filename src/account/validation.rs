//! Input validation for registration
//!
//! Validated types with private fields: the only way to obtain a
//! [`NewAccount`] is through [`NewAccount::new`], which trims and
//! normalizes the raw form input.

use std::fmt;

// ============================================================================
// Validation Errors
// ============================================================================

/// Registration input errors, reported inline to the user
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Please enter a valid email address.")]
    InvalidEmail { got: String },
}

// ============================================================================
// Email - Normalized email address
// ============================================================================

/// Lowercased, trimmed email that contains an `@` after a non-empty local part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Normalize and validate a raw email.
    ///
    /// ```
    /// use mockupi_wallet::account::validation::Email;
    ///
    /// let email = Email::parse("  Alice@X.com ").unwrap();
    /// assert_eq!(email.as_str(), "alice@x.com");
    /// assert_eq!(email.local_part(), "alice");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        match email.split_once('@') {
            Some((local, _)) if !local.is_empty() => Ok(Self(email)),
            _ => Err(ValidationError::InvalidEmail { got: email }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the first `@`
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// NewAccount - Validated registration input
// ============================================================================

/// Validated registration input
pub struct NewAccount {
    name: String,
    email: Email,
    password: String,
}

impl NewAccount {
    /// Check order: every field present, then email shape.
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        Ok(Self {
            name: name.to_string(),
            email: Email::parse(email)?,
            password: password.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Never print the password
impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized() {
        let email = Email::parse(" Bob@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "bob@example.com");
        assert_eq!(email.to_string(), "bob@example.com");
    }

    #[test]
    fn test_email_requires_at_sign() {
        let err = Email::parse("bob.example.com").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail { .. }));
    }

    #[test]
    fn test_email_requires_local_part() {
        let err = Email::parse("@example.com").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail { .. }));
    }

    #[test]
    fn test_local_part_stops_at_first_at() {
        let email = Email::parse("a@b@c").unwrap();
        assert_eq!(email.local_part(), "a");
    }

    #[test]
    fn test_new_account_missing_fields() {
        assert_eq!(
            NewAccount::new("", "a@x.com", "pw").unwrap_err(),
            ValidationError::MissingFields
        );
        assert_eq!(
            NewAccount::new("   ", "a@x.com", "pw").unwrap_err(),
            ValidationError::MissingFields
        );
        assert_eq!(
            NewAccount::new("Alice", "  ", "pw").unwrap_err(),
            ValidationError::MissingFields
        );
        assert_eq!(
            NewAccount::new("Alice", "a@x.com", "").unwrap_err(),
            ValidationError::MissingFields
        );
    }

    #[test]
    fn test_new_account_missing_fields_before_email_shape() {
        let err = NewAccount::new("", "not-an-email", "pw").unwrap_err();
        assert_eq!(err, ValidationError::MissingFields);
    }

    #[test]
    fn test_new_account_valid() {
        let acct = NewAccount::new(" Alice ", "Alice@X.com", "pw1").unwrap();
        assert_eq!(acct.name(), "Alice");
        assert_eq!(acct.email().as_str(), "alice@x.com");
        assert_eq!(acct.password(), "pw1");
        assert!(!format!("{:?}", acct).contains("pw1"));
    }
}

//! Password newtype and validation rules.
//!
//! A [`Password`] must never be logged, cloned, or serialized. The inner
//! string is zeroed when dropped.

use std::fmt;

use zeroize::Zeroize;

/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 4;

/// Maximum password length in characters.
pub const PASSWORD_MAX_CHARS: usize = 16;

/// Rejection reason for a password that fails the length rules.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordRuleError {
    #[error("password cannot be empty")]
    Empty,

    #[error("password must be {PASSWORD_MIN_CHARS}-{PASSWORD_MAX_CHARS} characters")]
    BadLength,
}

/// A user-supplied password.
pub struct Password {
    inner: String,
}

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Borrow the secret. Read-only access, never store the result.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Check the 4-16 character rule, enforced identically at first setup,
    /// encryption enablement, and rotation.
    pub fn validate(&self) -> Result<(), PasswordRuleError> {
        if self.inner.is_empty() {
            return Err(PasswordRuleError::Empty);
        }
        let chars = self.inner.chars().count();
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&chars) {
            return Err(PasswordRuleError::BadLength);
        }
        Ok(())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

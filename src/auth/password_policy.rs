//! Password complexity rules applied on registration and by the seed tool.

use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min_length} characters required")]
    TooShort { min_length: usize },

    #[error("Password too long: maximum {max_length} characters allowed")]
    TooLong { max_length: usize },

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingNumber,

    #[error("Password must contain at least one special character")]
    MissingSpecialChar,

    #[error("Password is in the list of commonly used passwords")]
    CommonPassword,
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_special_chars: bool,
    pub prevent_common_passwords: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special_chars: true,
            prevent_common_passwords: true,
        }
    }
}

fn common_passwords() -> &'static HashSet<&'static str> {
    static COMMON: OnceLock<HashSet<&'static str>> = OnceLock::new();
    COMMON.get_or_init(|| {
        [
            "password1!",
            "password123!",
            "p@ssw0rd",
            "p@ssword1",
            "qwerty123!",
            "welcome1!",
            "letmein1!",
            "azerty123!",
            "changeme1!",
        ]
        .into_iter()
        .collect()
    })
}

impl PasswordPolicy {
    /// Validate a password against the policy
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max_length: self.max_length,
            });
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }

        if self.require_numbers && !password.chars().any(|c| c.is_numeric()) {
            return Err(PasswordPolicyError::MissingNumber);
        }

        if self.require_special_chars && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(PasswordPolicyError::MissingSpecialChar);
        }

        if self.prevent_common_passwords
            && common_passwords().contains(password.to_lowercase().as_str())
        {
            return Err(PasswordPolicyError::CommonPassword);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_seeded_admin_password() {
        assert!(PasswordPolicy::default().validate("Admin123!").is_ok());
    }

    #[test]
    fn rejects_each_missing_class() {
        let policy = PasswordPolicy::default();
        assert_matches!(
            policy.validate("Ab1!"),
            Err(PasswordPolicyError::TooShort { min_length: 8 })
        );
        assert_matches!(
            policy.validate("pompe123!"),
            Err(PasswordPolicyError::MissingUppercase)
        );
        assert_matches!(
            policy.validate("POMPE123!"),
            Err(PasswordPolicyError::MissingLowercase)
        );
        assert_matches!(
            policy.validate("Pompe!!!x"),
            Err(PasswordPolicyError::MissingNumber)
        );
        assert_matches!(
            policy.validate("Pompe1234"),
            Err(PasswordPolicyError::MissingSpecialChar)
        );
        assert_matches!(
            policy.validate("Password123!"),
            Err(PasswordPolicyError::CommonPassword)
        );
    }
}

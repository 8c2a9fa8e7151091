//! Password policy enforcement for new passwords.

use bazaar_core::config::auth::AuthConfig;
use bazaar_core::error::{AppError, FieldErrors};

/// Validates password strength against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    max_length: usize,
    symbols: String,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
            symbols: config.password_symbols.clone(),
        }
    }

    /// Every rule the password breaks, in a stable order.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();
        let length = password.chars().count();

        if length < self.min_length {
            problems.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        if length > self.max_length {
            problems.push(format!(
                "Password must be at most {} characters long",
                self.max_length
            ));
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            problems.push("Password must contain at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            problems.push("Password must contain at least one uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Password must contain at least one digit".to_string());
        }
        if !password.chars().any(|c| self.symbols.contains(c)) {
            problems.push(format!(
                "Password must contain at least one of {}",
                self.symbols
            ));
        }
        problems
    }

    /// Validate a password, reporting every violation on the `password` field.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let problems = self.violations(password);
        if problems.is_empty() {
            return Ok(());
        }
        let mut fields = FieldErrors::new();
        fields.insert("password".to_string(), problems);
        Err(AppError::validation_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator().validate("Str0ng!Pw").is_ok());
    }

    #[test]
    fn test_each_rule_reported() {
        let v = validator();
        assert_eq!(v.violations("Sh0!t").len(), 1);
        assert_eq!(v.violations("str0ng!pw").len(), 1);
        assert_eq!(v.violations("STR0NG!PW").len(), 1);
        assert_eq!(v.violations("Strong!Pw").len(), 1);
        assert_eq!(v.violations("Str0ngPwd").len(), 1);
        assert_eq!(v.violations("").len(), 5);
    }

    #[test]
    fn test_symbol_outside_set_does_not_count() {
        assert!(validator().validate("Str0ng#Pw").is_err());
    }

    #[test]
    fn test_max_length() {
        let long = format!("Aa1!{}", "x".repeat(200));
        assert_eq!(validator().violations(&long).len(), 1);
    }

    #[test]
    fn test_field_level_details() {
        let err = validator().validate("weak").unwrap_err();
        let details = err.details.unwrap();
        assert!(details["fields"]["password"].as_array().unwrap().len() >= 3);
    }
}

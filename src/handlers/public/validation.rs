// handlers/public/validation.rs - registration input checks

use std::collections::HashMap;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_BUSINESS_NAME_LENGTH: usize = 20;
pub const MAX_LOCATION_LENGTH: usize = 100;

/// Validate username format and requirements
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LENGTH));
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

/// Basic email shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| "Invalid email format".to_string())?;

    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    // bcrypt only looks at the first 72 bytes
    if password.len() > 72 {
        return Err("Password must be at most 72 bytes".to_string());
    }
    Ok(())
}

/// Run every check and collect failures by field name
pub fn registration_field_errors(username: &str, email: &str, password: &str) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    if let Err(e) = validate_username_format(username) {
        errors.insert("username".to_string(), e);
    }
    if let Err(e) = validate_email_format(email) {
        errors.insert("email".to_string(), e);
    }
    if let Err(e) = validate_password(password) {
        errors.insert("password".to_string(), e);
    }
    errors
}

fn check_length(value: &str, label: &str, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(format!("{} cannot be empty", label));
    }
    if len > max {
        return Err(format!("{} must be at most {} characters", label, max));
    }
    Ok(())
}

/// Column limits for the editable business fields
pub fn business_field_errors(business_name: &str, city: &str, region: &str) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    let checks = [
        ("business_name", business_name, "Business name", MAX_BUSINESS_NAME_LENGTH),
        ("city", city, "City", MAX_LOCATION_LENGTH),
        ("region", region, "Region", MAX_LOCATION_LENGTH),
    ];
    for (field, value, label, max) in checks {
        if let Err(e) = check_length(value, label, max) {
            errors.insert(field.to_string(), e);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username_format("alice").is_ok());
        assert!(validate_username_format("shop_42-east").is_ok());

        assert!(validate_username_format("").is_err());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("a_very_long_username_x").is_err());
        assert!(validate_username_format("_alice").is_err());
        assert!(validate_username_format("ali ce").is_err());
        assert!(validate_username_format("ålice").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email_format("alice@example.com").is_ok());
        assert!(validate_email_format("a.b+c@mail.example.co").is_ok());

        for bad in ["", "alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "alice@example..com", "al ice@example.com"] {
            assert!(validate_email_format(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn passwords() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn collects_every_failing_field() {
        let errors = registration_field_errors("a", "nope", "short");
        assert_eq!(errors.len(), 3);
        assert!(registration_field_errors("alice", "alice@example.com", "password1").is_empty());
    }

    #[test]
    fn business_fields_fit_their_columns() {
        assert!(business_field_errors("Peggy Crafts", "Lagos", "Lagos State").is_empty());
        assert!(business_field_errors(&"b".repeat(20), &"c".repeat(100), "r").is_empty());

        let errors = business_field_errors(&"b".repeat(21), &"c".repeat(101), " ");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["business_name"], "Business name must be at most 20 characters");
        assert_eq!(errors["region"], "Region cannot be empty");
    }
}

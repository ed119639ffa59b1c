use crate::forms::FieldError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Validate a username usable as an LDAP `uid`: a lowercase letter followed
/// by lowercase letters, digits, `.`, `_` or `-`, at most 150 characters.
pub fn validate_username(username: &str) -> Option<FieldError> {
    let mut chars = username.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-'
    });
    if !starts_with_letter || !rest_ok {
        return Some(FieldError::new(
            "invalid",
            "Enter a valid username. This value must start with a lowercase letter and may \
             contain only lowercase letters, numbers, and ./_/- characters.",
        ));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Some(FieldError::new(
            "max_length",
            format!("Ensure this value has at most {USERNAME_MAX_LEN} characters."),
        ));
    }
    None
}

/// Validate an email: one '@' with a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Option<FieldError> {
    let invalid = || Some(FieldError::new("invalid", "Enter a valid email address."));
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return invalid();
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return invalid();
    };
    if local.is_empty() || local.contains('@') {
        return invalid();
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return invalid();
    }
    None
}

/// Validate a new password: minimum length, and not simply the username.
pub fn validate_password(password: &str, username: &str) -> Vec<FieldError> {
    let mut errors = vec![];
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(FieldError::new(
            "password_too_short",
            format!(
                "This password is too short. \
                 It must contain at least {PASSWORD_MIN_LEN} characters."
            ),
        ));
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        errors.push(FieldError::new(
            "password_too_similar",
            "The password is too similar to the username.",
        ));
    }
    errors
}

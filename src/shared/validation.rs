//! Input rules shared by signup, profile updates, posts and comments.

use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::models::MAX_DESCRIPTION_LEN;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Static segments under `/users/` that would shadow a profile path.
pub const RESERVED_USERNAMES: &[&str] = &["signup", "login", "logout", "search", "suggest", "user"];

/// Parse a client-supplied identifier.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, SharedError> {
    Uuid::parse_str(raw.trim()).map_err(|_| SharedError::malformed_id(field, raw))
}

/// Usernames are 3-30 characters, start with a letter, and contain only
/// ASCII letters, digits and underscores.
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_reserved_username(username: &str) -> bool {
    RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
}

pub fn validate_username(username: &str) -> Result<(), SharedError> {
    if !is_valid_username(username) {
        return Err(SharedError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if is_reserved_username(username) {
        return Err(SharedError::validation("username", "Username is reserved"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SharedError::validation("email", "Invalid email format"))
    }
}

pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SharedError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Check a post or comment body. An empty body is rejected only when
/// `required` is set.
pub fn validate_description(description: &str, required: bool) -> Result<(), SharedError> {
    if required && description.trim().is_empty() {
        return Err(SharedError::validation("description", "Description is required"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(SharedError::validation(
            "description",
            format!("Description must be at most {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(())
}

use actix_session::Session;
use rand::Rng;

use crate::errors::AppError;

const SESSION_KEY: &str = "csrf_token";

/// Get the CSRF token from the session, or generate and store a new one.
pub fn get_or_create_token(session: &Session) -> String {
    if let Ok(Some(token)) = session.get::<String>(SESSION_KEY) {
        return token;
    }
    let token = generate_token();
    let _ = session.insert(SESSION_KEY, &token);
    token
}

/// Check a submitted token against the one stored in the session.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored = session
        .get::<String>(SESSION_KEY)
        .unwrap_or(None)
        .unwrap_or_default();
    if tokens_match(&stored, submitted) {
        Ok(())
    } else {
        log::warn!("Rejected form post with a bad CSRF token");
        Err(AppError::Csrf)
    }
}

fn tokens_match(stored: &str, submitted: &str) -> bool {
    if stored.is_empty() || stored.len() != submitted.len() {
        return false;
    }
    // Constant time over the token length.
    stored
        .bytes()
        .zip(submitted.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stored_token_never_matches() {
        assert!(!tokens_match("", ""));
    }

    #[test]
    fn tokens_compare_by_content() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, &generate_token()));
        assert!(!tokens_match(&token, &token[..10]));
    }
}

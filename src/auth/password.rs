use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Stored in place of a hash for accounts that authenticate against LDAP only.
pub const LDAP_MANAGED_PASSWORD: &str = "invalid";

pub fn is_ldap_managed(stored: &str) -> bool {
    stored == LDAP_MANAGED_PASSWORD
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?;
    Ok(hash.to_string())
}

/// Compare a plaintext password with a stored PHC hash.
///
/// A stored value that is not a parseable hash (such as the LDAP sentinel)
/// never matches.
pub fn check_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

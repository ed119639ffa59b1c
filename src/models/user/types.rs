/// Account used to log in. `password` is an argon2 hash, or the LDAP
/// sentinel for accounts whose credentials live in the directory.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub is_staff: bool,
    pub person: Option<i64>,
}

/// New account data for creation.
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_staff: bool,
    pub person: Option<i64>,
}

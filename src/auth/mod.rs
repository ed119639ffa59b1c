pub mod csrf;
pub mod ldap;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod validate;

use crate::errors::AppError;
use crate::models::user::User;
use ldap::Directory;

/// Verify a member's password wherever it is kept: in the directory for
/// LDAP-managed accounts, against the local hash otherwise.
pub async fn check_account_password(
    user: &User,
    password: &str,
    directory: &Directory,
) -> Result<bool, AppError> {
    if password::is_ldap_managed(&user.password) {
        Ok(directory.check_member_password(&user.username, password).await?)
    } else {
        Ok(password::check_password(password, &user.password))
    }
}

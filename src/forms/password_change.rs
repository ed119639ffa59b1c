use super::{Cleaned, FieldError, FieldSpec, Fields, FormData, clean_fields};
use crate::auth::{self, ldap::Directory, validate};
use crate::errors::AppError;
use crate::models::user::User;

pub const PASSWORD_INCORRECT: &str =
    "Your old password was entered incorrectly. Please enter it again.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";

/// Cleaned result of a password change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Password change form that verifies old passwords of LDAP-managed
/// accounts with a directory bind instead of the local hash.
pub struct MyPasswordChangeForm<'a> {
    pub fields: Fields,
    user: &'a User,
    directory: &'a Directory,
}

impl<'a> MyPasswordChangeForm<'a> {
    pub fn new(user: &'a User, directory: &'a Directory) -> Self {
        let fields = Fields::new(vec![
            FieldSpec::password("old_password", "Old password"),
            FieldSpec::password("new_password1", "New password").help(&format!(
                "Your password can’t be too similar to your username \
                 and must contain at least {} characters.",
                validate::PASSWORD_MIN_LEN
            )),
            FieldSpec::password("new_password2", "New password confirmation"),
        ]);
        Self { fields, user, directory }
    }

    pub async fn clean(&self, data: &FormData) -> Result<Cleaned<PasswordChange>, AppError> {
        let (mut cleaned, mut errors) = clean_fields(&self.fields, data);

        let old_password = if cleaned.contains("old_password") {
            let submitted = cleaned.take_text("old_password");
            match self.clean_old_password(submitted).await? {
                Ok(old) => Some(old),
                Err(err) => {
                    errors.add("old_password", err);
                    None
                }
            }
        } else {
            None
        };

        let new_password1 = cleaned.take_text("new_password1");
        if cleaned.contains("new_password2") {
            let new_password2 = cleaned.take_text("new_password2");
            for err in self.clean_new_password2(&new_password1, &new_password2) {
                errors.add("new_password2", err);
            }
        }

        Ok(errors.into_result(PasswordChange {
            old_password: old_password.unwrap_or_default(),
            new_password: new_password1,
        }))
    }

    /// Accounts whose stored password is the LDAP sentinel are checked with
    /// a directory bind; a successful bind accepts the value without any
    /// local comparison. Other accounts compare against their hash.
    async fn clean_old_password(
        &self,
        old_password: String,
    ) -> Result<Result<String, FieldError>, AppError> {
        if auth::check_account_password(self.user, &old_password, self.directory).await? {
            Ok(Ok(old_password))
        } else {
            Ok(Err(FieldError::new("password_incorrect", PASSWORD_INCORRECT)))
        }
    }

    fn clean_new_password2(&self, new_password1: &str, new_password2: &str) -> Vec<FieldError> {
        if !new_password1.is_empty() && new_password1 != new_password2 {
            return vec![FieldError::new("password_mismatch", PASSWORD_MISMATCH)];
        }
        validate::validate_password(new_password2, &self.user.username)
    }
}

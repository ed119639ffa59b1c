use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::User;

pub const PROFILE_PAGE: &str = "/profile";
pub const REQUESTS_PAGE: &str = "/admin/membership-requests";

/// First page after logging in. Staff accounts without a person record,
/// like the bootstrap account, have no profile and start on the request list.
pub fn landing_page(user: &User) -> &'static str {
    if user.is_staff && user.person.is_none() {
        REQUESTS_PAGE
    } else {
        PROFILE_PAGE
    }
}

/// Store the logged-in account in the session.
pub fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", user.id)
        .and_then(|_| session.insert("username", &user.username))
        .and_then(|_| session.insert("is_staff", user.is_staff))
        .and_then(|_| session.insert("landing", landing_page(user)))
        .map_err(|e| AppError::Session(e.to_string()))
}

/// Landing page recorded at login; the profile for anonymous sessions.
pub fn landing(session: &Session) -> String {
    session
        .get::<String>("landing")
        .unwrap_or(None)
        .unwrap_or_else(|| PROFILE_PAGE.to_string())
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Option<String> {
    session.get::<String>("username").unwrap_or(None)
}

pub fn is_staff(session: &Session) -> bool {
    session.get::<bool>("is_staff").unwrap_or(None).unwrap_or(false)
}

/// Logged-in account id, or a session error for handlers behind `require_auth`.
pub fn require_user_id(session: &Session) -> Result<i64, AppError> {
    get_user_id(session).ok_or_else(|| AppError::Session("User not logged in".to_string()))
}

/// Admin pages are reserved for staff accounts.
pub fn require_staff(session: &Session) -> Result<(), AppError> {
    if is_staff(session) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

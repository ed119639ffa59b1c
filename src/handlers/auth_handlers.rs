use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::ldap::Directory;
use crate::auth::middleware::safe_next;
use crate::auth::rate_limit::LoginThrottle;
use crate::auth::{self, csrf, session as member_session};
use crate::errors::{AppError, render, see_other};
use crate::models::user;
use crate::templates_structs::{LoginTemplate, PageContext};

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    // Missing tokens reach `validate_csrf` and get a 403, not a 400.
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    #[serde(default)]
    pub csrf_token: String,
}

pub async fn login_page(
    session: Session,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, AppError> {
    if member_session::get_user_id(&session).is_some() {
        return Ok(see_other(&member_session::landing(&session)));
    }

    let tmpl = LoginTemplate {
        ctx: PageContext::build(&session),
        error: None,
        username: String::new(),
        next: query.next.clone().unwrap_or_default(),
    };
    render(tmpl)
}

fn failed_login(
    session: &Session,
    message: &str,
    username: &str,
    next: &str,
) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        ctx: PageContext::build(session),
        error: Some(message.to_string()),
        username: username.to_string(),
        next: next.to_string(),
    };
    render(tmpl)
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    directory: web::Data<Directory>,
    throttle: web::Data<LoginThrottle>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let username = form.username.trim();
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    // Checked before the database or the directory is touched
    if throttle.is_blocked(ip) {
        log::warn!("Login for '{username}' refused: too many failures from {ip}");
        return failed_login(
            &session,
            "Too many failed login attempts. Please try again later.",
            username,
            &form.next,
        );
    }

    let found = user::find_by_username(&pool, username).await?;
    let authenticated = match &found {
        Some(u) => auth::check_account_password(u, &form.password, &directory).await?,
        None => false,
    };

    match found {
        Some(u) if authenticated => {
            throttle.clear(ip);
            member_session::log_in(&session, &u)?;
            log::info!("User '{}' logged in", u.username);
            let target = safe_next(&form.next).unwrap_or(member_session::landing_page(&u));
            Ok(see_other(target))
        }
        _ => {
            throttle.record_failure(ip);
            log::warn!("Failed login for '{username}' from {ip}");
            failed_login(&session, "Invalid username or password", username, &form.next)
        }
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(see_other("/login"))
}

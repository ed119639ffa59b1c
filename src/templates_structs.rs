// Template context structures for askama templates.

use actix_session::Session;
use askama::Template;

use crate::auth::csrf;
use crate::auth::session::{get_username, is_staff, take_flash};
use crate::forms::{BoundField, Media};
use crate::models::membership_request::MembershipRequest;

pub const APP_NAME: &str = "Quadrivium members";

/// Common context shared by all pages. Templates access these as `ctx.username`, etc.
pub struct PageContext {
    pub app_name: &'static str,
    pub username: Option<String>,
    pub is_staff: bool,
    pub flash: Option<String>,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Self {
        Self {
            app_name: APP_NAME,
            username: get_username(session),
            is_staff: is_staff(session),
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub username: String,
    pub next: String,
}

/// Any of the member forms.
#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub intro: Option<String>,
    pub action: String,
    pub submit_label: String,
    pub fields: Vec<BoundField>,
    pub non_field_errors: Vec<String>,
    pub media: Media,
}

#[derive(Template)]
#[template(path = "membership_requests.html")]
pub struct RequestListTemplate {
    pub ctx: PageContext,
    pub requests: Vec<MembershipRequest>,
}

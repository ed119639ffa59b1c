pub mod account_handlers;
pub mod auth_handlers;
pub mod membership_request_handlers;
pub mod profile_handlers;
pub mod subscribe_handlers;

use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth;
use crate::errors::{AppError, render, see_other};
use crate::forms::{self, Fields, FormData, FormErrors, Media};
use crate::templates_structs::{FormTemplate, PageContext};

/// Register every route. Member pages sit behind `require_auth`; the admin
/// handlers check the staff flag themselves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/subscribe", web::get().to(subscribe_handlers::form))
        .route("/subscribe", web::post().to(subscribe_handlers::submit))
        .route("/", web::get().to(root))
        // Protected routes
        .service(
            web::scope("")
                .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/profile", web::get().to(profile_handlers::form))
                .route("/profile", web::post().to(profile_handlers::submit))
                .route("/password", web::get().to(account_handlers::form))
                .route("/password", web::post().to(account_handlers::submit))
                // Admin
                .route(
                    "/admin/membership-requests",
                    web::get().to(membership_request_handlers::list),
                )
                .route(
                    "/admin/membership-requests/{id}/process",
                    web::get().to(membership_request_handlers::process_form),
                )
                .route(
                    "/admin/membership-requests/{id}/process",
                    web::post().to(membership_request_handlers::process_submit),
                ),
        );
}

async fn root(session: Session) -> HttpResponse {
    see_other(&auth::session::landing(&session))
}

/// Parse a form body and check its CSRF token.
pub(crate) fn read_form(session: &Session, body: &web::Bytes) -> Result<FormData, AppError> {
    let data = FormData::from_bytes(body);
    auth::csrf::validate_csrf(session, data.get("csrf_token"))?;
    Ok(data)
}

/// What a form page shows besides its fields.
pub(crate) struct FormPage {
    pub title: &'static str,
    pub intro: Option<String>,
    pub action: String,
    pub submit_label: &'static str,
    pub media: Media,
}

pub(crate) fn render_form(
    session: &Session,
    page: FormPage,
    fields: &Fields,
    data: &FormData,
    errors: &FormErrors,
) -> Result<HttpResponse, AppError> {
    let tmpl = FormTemplate {
        ctx: PageContext::build(session),
        title: page.title.to_string(),
        intro: page.intro,
        action: page.action,
        submit_label: page.submit_label.to_string(),
        fields: forms::bind(fields, data, errors),
        non_field_errors: errors.non_field().iter().map(|e| e.message.clone()).collect(),
        media: page.media,
    };
    render(tmpl)
}

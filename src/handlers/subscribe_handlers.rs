use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use super::{FormPage, read_form, render_form};
use crate::auth::session::set_flash;
use crate::errors::{AppError, see_other};
use crate::forms::{FormData, FormErrors, Media, subscribe::SubscribeForm};
use crate::models::membership_request;

fn page() -> FormPage {
    FormPage {
        title: "Become a member",
        intro: Some(
            "Fill in this form to subscribe to Quadrivium. The board will process your request."
                .to_string(),
        ),
        action: "/subscribe".to_string(),
        submit_label: "Subscribe",
        media: Media::default(),
    }
}

pub async fn form(session: Session) -> Result<HttpResponse, AppError> {
    let form = SubscribeForm::new();
    render_form(&session, page(), &form.fields, &FormData::default(), &FormErrors::default())
}

pub async fn submit(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let data = read_form(&session, &body)?;

    let form = SubscribeForm::new();
    match form.clean(&data) {
        Ok(request) => {
            let id = membership_request::create(&pool, &request).await?;
            log::info!("Membership request {id} received");
            set_flash(
                &session,
                "Thank you for subscribing! \
                 You will receive an email once your request has been processed.",
            );
            Ok(see_other("/subscribe"))
        }
        Err(errors) => render_form(&session, page(), &form.fields, &data, &errors),
    }
}

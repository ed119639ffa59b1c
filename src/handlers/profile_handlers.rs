use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use super::{FormPage, read_form, render_form};
use crate::auth::session::{REQUESTS_PAGE, is_staff, require_user_id, set_flash};
use crate::errors::{AppError, see_other};
use crate::forms::{FormErrors, Media, profile::ProfileForm};
use crate::models::person::{self, Person};

fn page(person: &Person) -> FormPage {
    FormPage {
        title: "Profile",
        intro: Some(format!("Contact details of {}.", person.full_name())),
        action: "/profile".to_string(),
        submit_label: "Save",
        media: Media::default(),
    }
}

async fn current_person(pool: &PgPool, session: &Session) -> Result<Option<Person>, AppError> {
    let user_id = require_user_id(session)?;
    person::find_by_user_id(pool, user_id).await
}

/// Accounts without a person record, such as the bootstrap staff account,
/// have nothing to edit here.
fn no_profile(session: &Session) -> HttpResponse {
    if is_staff(session) {
        return see_other(REQUESTS_PAGE);
    }
    set_flash(session, "There is no profile linked to your account.");
    see_other("/password")
}

pub async fn form(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let Some(person) = current_person(&pool, &session).await? else {
        return Ok(no_profile(&session));
    };
    let form = ProfileForm::new();
    render_form(
        &session,
        page(&person),
        &form.fields,
        &ProfileForm::initial(&person),
        &FormErrors::default(),
    )
}

pub async fn submit(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let data = read_form(&session, &body)?;
    let Some(person) = current_person(&pool, &session).await? else {
        return Ok(no_profile(&session));
    };

    let form = ProfileForm::new();
    match form.clean(&data) {
        Ok(update) => {
            person::update_profile(&pool, person.id, &update).await?;
            log::info!("Profile of person {} updated", person.id);
            set_flash(&session, "Your profile has been updated.");
            Ok(see_other("/profile"))
        }
        Err(errors) => render_form(&session, page(&person), &form.fields, &data, &errors),
    }
}

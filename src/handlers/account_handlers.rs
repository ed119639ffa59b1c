use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use super::{FormPage, read_form, render_form};
use crate::auth::ldap::Directory;
use crate::auth::password;
use crate::auth::session::{landing_page, require_user_id, set_flash};
use crate::errors::{AppError, see_other};
use crate::forms::{FormData, FormErrors, Media, password_change::MyPasswordChangeForm};
use crate::models::user::{self, User};

fn page() -> FormPage {
    FormPage {
        title: "Change password",
        intro: Some(
            "Please enter your old password, and then enter your new password twice.".to_string(),
        ),
        action: "/password".to_string(),
        submit_label: "Change my password",
        media: Media::default(),
    }
}

async fn current_user(pool: &PgPool, session: &Session) -> Result<User, AppError> {
    let user_id = require_user_id(session)?;
    user::find_by_id(pool, user_id).await?.ok_or(AppError::NotFound)
}

pub async fn form(
    pool: web::Data<PgPool>,
    directory: web::Data<Directory>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&pool, &session).await?;
    let form = MyPasswordChangeForm::new(&user, &directory);
    render_form(&session, page(), &form.fields, &FormData::default(), &FormErrors::default())
}

pub async fn submit(
    pool: web::Data<PgPool>,
    directory: web::Data<Directory>,
    session: Session,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let data = read_form(&session, &body)?;
    let user = current_user(&pool, &session).await?;

    let form = MyPasswordChangeForm::new(&user, &directory);
    match form.clean(&data).await? {
        Ok(change) => {
            let hash = password::hash_password(&change.new_password).map_err(AppError::Hash)?;
            user::update_password(&pool, user.id, &hash).await?;
            log::info!("User '{}' changed their password", user.username);
            set_flash(&session, "Your password was changed.");
            Ok(see_other(landing_page(&user)))
        }
        Err(errors) => render_form(&session, page(), &form.fields, &data, &errors),
    }
}

use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use super::{FormPage, read_form, render_form};
use crate::auth::session::{require_staff, set_flash};
use crate::errors::{AppError, render, see_other};
use crate::forms::process_request::ProcessMembershipRequestForm;
use crate::forms::{FieldError, FormData, FormErrors};
use crate::models::membership_request::{self, MembershipRequest};
use crate::models::instrument;
use crate::templates_structs::{PageContext, RequestListTemplate};

const LIST_PATH: &str = "/admin/membership-requests";
const ACCOUNT_CONFLICT: &str =
    "An account with this username or person ID was created meanwhile. Please choose another one.";

fn page(request: &MembershipRequest, action: &str) -> FormPage {
    let intro = format!(
        "Create an account for {} ({}), who subscribed on {}.",
        request.full_name(),
        request.email,
        request.submitted_on()
    );
    FormPage {
        title: "Process membership request",
        intro: Some(intro),
        action: action.to_string(),
        submit_label: "Create account",
        media: ProcessMembershipRequestForm::media(),
    }
}

pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_staff(&session)?;
    let requests = membership_request::find_pending(&pool).await?;
    let tmpl = RequestListTemplate {
        ctx: PageContext::build(&session),
        requests,
    };
    render(tmpl)
}

pub async fn process_form(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_staff(&session)?;
    let id = path.into_inner();
    let request = membership_request::find_pending_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let instruments = instrument::find_all(&pool).await?;

    let form = ProcessMembershipRequestForm::new(&instruments, pool.get_ref());
    let action = format!("{LIST_PATH}/{id}/process");
    render_form(
        &session,
        page(&request, &action),
        &form.fields,
        &FormData::default(),
        &FormErrors::default(),
    )
}

pub async fn process_submit(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    require_staff(&session)?;
    let data = read_form(&session, &body)?;
    let id = path.into_inner();
    let request = membership_request::find_pending_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let instruments = instrument::find_all(&pool).await?;

    let form = ProcessMembershipRequestForm::new(&instruments, pool.get_ref());
    let action = format!("{LIST_PATH}/{id}/process");

    let cleaned = match form.clean(&data).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return render_form(&session, page(&request, &action), &form.fields, &data, &errors);
        }
    };

    let processed = membership_request::process(
        &pool,
        &request,
        &cleaned.username,
        &cleaned.person_id,
        &cleaned.instruments,
    )
    .await;
    match processed {
        Ok(_) => {
            set_flash(&session, &format!("Account '{}' was created.", cleaned.username));
            Ok(see_other(LIST_PATH))
        }
        // Lost a race with another admin between the check and the insert.
        Err(AppError::Db(e)) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(FieldError::new("unique", ACCOUNT_CONFLICT));
            render_form(&session, page(&request, &action), &form.fields, &data, &errors)
        }
        Err(e) => Err(e),
    }
}

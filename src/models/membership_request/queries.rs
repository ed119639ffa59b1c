use sqlx::PgPool;

use super::types::{MembershipRequest, NewMembershipRequest};
use crate::auth::password::LDAP_MANAGED_PASSWORD;
use crate::errors::AppError;
use crate::models::{instrument, user};

const SELECT_REQUEST: &str = "\
    SELECT id, first_name, last_name, initials, email, phone_number, street, postal_code, \
           city, country, gender, date_of_birth, preferred_language, field_of_study, \
           is_student, iban, tue_card_number, remarks, sub_association, instruments, \
           photo_video_consent_external_group, photo_video_consent_external, \
           photo_video_consent_internal, created_at, processed_at \
    FROM membership_requests";

pub async fn create(pool: &PgPool, new: &NewMembershipRequest) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO membership_requests (\
             first_name, last_name, initials, email, phone_number, street, postal_code, city, \
             country, gender, date_of_birth, preferred_language, field_of_study, is_student, \
             iban, tue_card_number, remarks, sub_association, instruments, \
             photo_video_consent_external_group, photo_video_consent_external, \
             photo_video_consent_internal) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22) \
         RETURNING id",
    )
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.initials)
    .bind(&new.email)
    .bind(&new.phone_number)
    .bind(&new.street)
    .bind(&new.postal_code)
    .bind(&new.city)
    .bind(&new.country)
    .bind(&new.gender)
    .bind(new.date_of_birth)
    .bind(&new.preferred_language)
    .bind(&new.field_of_study)
    .bind(new.is_student)
    .bind(&new.iban)
    .bind(&new.tue_card_number)
    .bind(&new.remarks)
    .bind(&new.sub_association)
    .bind(&new.instruments)
    .bind(new.photo_video_consent_external_group)
    .bind(new.photo_video_consent_external)
    .bind(new.photo_video_consent_internal)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Requests nobody has processed yet, oldest first.
pub async fn find_pending(pool: &PgPool) -> Result<Vec<MembershipRequest>, AppError> {
    let requests = sqlx::query_as::<_, MembershipRequest>(&format!(
        "{SELECT_REQUEST} WHERE processed_at IS NULL ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(requests)
}

pub async fn find_pending_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<MembershipRequest>, AppError> {
    let request = sqlx::query_as::<_, MembershipRequest>(&format!(
        "{SELECT_REQUEST} WHERE id = $1 AND processed_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(request)
}

/// Turn an approved request into a person with an account, in one transaction.
///
/// The account gets the LDAP sentinel as password: its credentials are
/// provisioned in the directory. Returns the new account id.
pub async fn process(
    pool: &PgPool,
    request: &MembershipRequest,
    username: &str,
    person_id: &str,
    instruments: &[i64],
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let person: i64 = sqlx::query_scalar(
        "INSERT INTO persons (\
             first_name, last_name, initials, email, phone_number, street, postal_code, city, \
             country, gender, date_of_birth, preferred_language, person_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING id",
    )
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(&request.initials)
    .bind(&request.email)
    .bind(&request.phone_number)
    .bind(&request.street)
    .bind(&request.postal_code)
    .bind(&request.city)
    .bind(&request.country)
    .bind(&request.gender)
    .bind(request.date_of_birth)
    .bind(&request.preferred_language)
    .bind(person_id)
    .fetch_one(&mut *tx)
    .await?;

    instrument::assign_to_person(&mut *tx, person, instruments).await?;

    let new_user = user::NewUser {
        username: username.to_string(),
        password: LDAP_MANAGED_PASSWORD.to_string(),
        is_staff: false,
        person: Some(person),
    };
    let user_id = user::create(&mut *tx, &new_user).await?;

    let marked = sqlx::query(
        "UPDATE membership_requests SET processed_at = now(), processed_user = $1 \
         WHERE id = $2 AND processed_at IS NULL",
    )
    .bind(user_id)
    .bind(request.id)
    .execute(&mut *tx)
    .await?;
    if marked.rows_affected() == 0 {
        // Someone else processed it meanwhile; dropping `tx` rolls back.
        return Err(AppError::NotFound);
    }

    tx.commit().await?;
    log::info!("Membership request {} processed into account '{}'", request.id, username);
    Ok(user_id)
}

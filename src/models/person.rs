use chrono::NaiveDate;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::forms::{FieldError, FieldSpec, choices};
use crate::models::user::AccountLookup;

pub const PREFERRED_LANGUAGES: &[(&str, &str)] = &[("nl", "Dutch"), ("en", "English")];

/// A member's personal record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub preferred_language: Option<String>,
    pub person_id: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Contact details a member may edit themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub preferred_language: String,
}

/// Default form field for a person column. Nullable columns give optional fields.
pub fn form_field(name: &str) -> Option<FieldSpec> {
    let spec = match name {
        "email" => FieldSpec::email("email", "Email").required(false),
        "phone_number" => FieldSpec::char("phone_number", "Phone number", 40).required(false),
        "street" => FieldSpec::char("street", "Street", 100).required(false),
        "postal_code" => FieldSpec::char("postal_code", "Postal code", 10).required(false),
        "city" => FieldSpec::char("city", "City", 100).required(false),
        "country" => FieldSpec::char("country", "Country", 100).required(false),
        "preferred_language" => FieldSpec::choice(
            "preferred_language",
            "Preferred language",
            choices(PREFERRED_LANGUAGES),
        )
        .required(false),
        _ => return None,
    };
    Some(spec)
}

const SELECT_PERSON: &str = "\
    SELECT p.id, p.first_name, p.last_name, p.initials, p.email, p.phone_number, \
           p.street, p.postal_code, p.city, p.country, p.gender, p.date_of_birth, \
           p.preferred_language, p.person_id \
    FROM persons p";

/// The person record linked to an account, if any.
pub async fn find_by_user_id(pool: &PgPool, user_id: i64) -> Result<Option<Person>, AppError> {
    let person = sqlx::query_as::<_, Person>(&format!(
        "{SELECT_PERSON} JOIN users u ON u.person = p.id WHERE u.id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(person)
}

pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    update: &ProfileUpdate,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE persons SET email = $1, phone_number = $2, street = $3, postal_code = $4, \
                city = $5, country = $6, preferred_language = $7 \
         WHERE id = $8",
    )
    .bind(&update.email)
    .bind(&update.phone_number)
    .bind(&update.street)
    .bind(&update.postal_code)
    .bind(&update.city)
    .bind(&update.country)
    .bind(&update.preferred_language)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn person_id_exists(pool: &PgPool, person_id: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM persons WHERE person_id = $1)")
            .bind(person_id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Person ids identify members across administrations and may be used once.
pub async fn validate_person_id_unique(
    accounts: &dyn AccountLookup,
    person_id: &str,
) -> Result<Option<FieldError>, AppError> {
    if accounts.person_id_exists(person_id).await? {
        return Ok(Some(FieldError::new(
            "unique",
            "A person with this person ID already exists.",
        )));
    }
    Ok(None)
}

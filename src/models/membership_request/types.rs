use chrono::{DateTime, NaiveDate, Utc};

use crate::forms::{FieldSpec, choices};
use crate::models::person::PREFERRED_LANGUAGES;

pub const GENDER_CHOICES: &[(&str, &str)] =
    &[("male", "Male"), ("female", "Female"), ("other", "Other")];

pub const SUB_ASSOCIATIONS: &[(&str, &str)] = &[
    ("vokollage", "Vokollage (choir)"),
    ("ensuite", "Ensuite (symphony orchestra)"),
    ("auletes", "Auletes (wind orchestra)"),
    ("none", "None / undecided"),
];

pub const CONSENT_EXTERNAL_GROUP_HELP: &str = "Do you give permission to use photos and videos of \
    groups in which you appear for external purposes, such as our website and social media?";
pub const CONSENT_EXTERNAL_HELP: &str = "Do you give permission to use photos and videos in which \
    you are clearly recognizable for external purposes, such as our website and social media?";
pub const CONSENT_INTERNAL_HELP: &str = "Do you give permission to use photos and videos in which \
    you appear for internal purposes, such as the members-only photo album?";

/// A submitted request to become a member, waiting for an administrator.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipRequest {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub preferred_language: Option<String>,
    pub field_of_study: Option<String>,
    pub is_student: bool,
    pub iban: Option<String>,
    pub tue_card_number: Option<String>,
    pub remarks: Option<String>,
    pub sub_association: Option<String>,
    pub instruments: Option<String>,
    pub photo_video_consent_external_group: bool,
    pub photo_video_consent_external: bool,
    pub photo_video_consent_internal: bool,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl MembershipRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn submitted_on(&self) -> String {
        self.created_at.format("%d-%m-%Y").to_string()
    }
}

/// Cleaned subscription data, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembershipRequest {
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub preferred_language: String,
    pub field_of_study: Option<String>,
    pub is_student: bool,
    pub iban: Option<String>,
    pub tue_card_number: Option<String>,
    pub remarks: Option<String>,
    pub sub_association: Option<String>,
    pub instruments: String,
    pub photo_video_consent_external_group: bool,
    pub photo_video_consent_external: bool,
    pub photo_video_consent_internal: bool,
}

/// Default form field for a membership request column.
pub fn form_field(name: &str) -> Option<FieldSpec> {
    let spec = match name {
        "first_name" => FieldSpec::char("first_name", "First name", 150),
        "last_name" => FieldSpec::char("last_name", "Last name", 150),
        "initials" => FieldSpec::char("initials", "Initials", 30).required(false),
        "email" => FieldSpec::email("email", "Email"),
        "phone_number" => FieldSpec::char("phone_number", "Phone number", 40).required(false),
        "street" => FieldSpec::char("street", "Street and house number", 100).required(false),
        "postal_code" => FieldSpec::char("postal_code", "Postal code", 10).required(false),
        "city" => FieldSpec::char("city", "City", 100).required(false),
        "country" => FieldSpec::char("country", "Country", 100).required(false),
        "gender" => FieldSpec::choice("gender", "Gender", choices(GENDER_CHOICES)).required(false),
        "date_of_birth" => FieldSpec::date("date_of_birth", "Date of birth")
            .required(false)
            .help("Format: dd-mm-yyyy"),
        "preferred_language" => FieldSpec::choice(
            "preferred_language",
            "Preferred language",
            choices(PREFERRED_LANGUAGES),
        )
        .required(false),
        "field_of_study" => {
            FieldSpec::char("field_of_study", "Field of study", 150).required(false)
        }
        "is_student" => FieldSpec::boolean("is_student", "Are you a student?"),
        "iban" => FieldSpec::char("iban", "IBAN", 34).required(false),
        "tue_card_number" => {
            FieldSpec::char("tue_card_number", "TU/e card number", 30).required(false)
        }
        "remarks" => FieldSpec::text("remarks", "Remarks").required(false),
        "sub_association" => FieldSpec::choice(
            "sub_association",
            "Which sub-association would you like to join?",
            choices(SUB_ASSOCIATIONS),
        )
        .required(false),
        "instruments" => FieldSpec::char(
            "instruments",
            "Which instrument(s) do you play, or which voice type do you have?",
            255,
        )
        .required(false),
        "photo_video_consent_external_group" => FieldSpec::boolean(
            "photo_video_consent_external_group",
            "Photo/video consent (external, group)",
        )
        .help(CONSENT_EXTERNAL_GROUP_HELP),
        "photo_video_consent_external" => {
            FieldSpec::boolean("photo_video_consent_external", "Photo/video consent (external)")
                .help(CONSENT_EXTERNAL_HELP)
        }
        "photo_video_consent_internal" => {
            FieldSpec::boolean("photo_video_consent_internal", "Photo/video consent (internal)")
                .help(CONSENT_INTERNAL_HELP)
        }
        _ => return None,
    };
    Some(spec)
}

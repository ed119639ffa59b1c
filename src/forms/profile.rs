use super::{Cleaned, Fields, FormData, clean_fields};
use crate::models::person::{self, Person, ProfileUpdate};

/// Person fields a member may edit; all of them are required here even
/// though older records may lack them.
pub const PROFILE_FIELDS: &[&str] = &[
    "email",
    "phone_number",
    "street",
    "postal_code",
    "city",
    "country",
    "preferred_language",
];

const EMAIL_HELP: &str =
    "If you change your email address, members mail will be sent to the new address.";

/// Lets a member change some of their profile data.
pub struct ProfileForm {
    pub fields: Fields,
}

impl ProfileForm {
    pub fn new() -> Self {
        let mut fields =
            Fields::new(PROFILE_FIELDS.iter().filter_map(|f| person::form_field(f)).collect());
        if let Some(email) = fields.get_mut("email") {
            email.help_text = Some(EMAIL_HELP.to_string());
        }
        fields.require(PROFILE_FIELDS);
        Self { fields }
    }

    /// Values to prefill the form with.
    pub fn initial(person: &Person) -> FormData {
        let values = [
            ("email", &person.email),
            ("phone_number", &person.phone_number),
            ("street", &person.street),
            ("postal_code", &person.postal_code),
            ("city", &person.city),
            ("country", &person.country),
            ("preferred_language", &person.preferred_language),
        ];
        FormData::from_pairs(
            values
                .into_iter()
                .map(|(name, value)| (name, value.clone().unwrap_or_default())),
        )
    }

    pub fn clean(&self, data: &FormData) -> Cleaned<ProfileUpdate> {
        let (mut cleaned, errors) = clean_fields(&self.fields, data);
        errors.into_result(())?;
        Ok(ProfileUpdate {
            email: cleaned.take_text("email"),
            phone_number: cleaned.take_text("phone_number"),
            street: cleaned.take_text("street"),
            postal_code: cleaned.take_text("postal_code"),
            city: cleaned.take_text("city"),
            country: cleaned.take_text("country"),
            preferred_language: cleaned.take_text("preferred_language"),
        })
    }
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self::new()
    }
}

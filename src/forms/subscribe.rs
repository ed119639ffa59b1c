use super::{
    Cleaned, CleanedData, FieldKind, FieldSpec, Fields, FormData, FormErrors, Value, Widget,
    choices, clean_fields,
};
use crate::models::membership_request::{
    self as request, GENDER_CHOICES, NewMembershipRequest,
};
use crate::models::person::PREFERRED_LANGUAGES;

/// Field order of the subscription form.
pub const FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "initials",
    "email",
    "phone_number",
    "street",
    "postal_code",
    "city",
    "country",
    "gender",
    "date_of_birth",
    "preferred_language",
    "field_of_study",
    "is_student",
    "iban",
    "tue_card_number",
    "remarks",
    "sub_association",
    "instruments",
    "photo_video_consent_external_group",
    "photo_video_consent_external",
    "photo_video_consent_internal",
    "ensure_subscribe",
    "add_to_chats",
];

/// Required regardless of the request table allowing nulls: older records
/// lack some of these, new requests may not.
pub const REQUIRED: &[&str] = &[
    "first_name",
    "last_name",
    "initials",
    "email",
    "phone_number",
    "street",
    "postal_code",
    "city",
    "country",
    "gender",
    "date_of_birth",
    "preferred_language",
    "is_student",
    "instruments",
    "photo_video_consent_external_group",
    "photo_video_consent_external",
    "photo_video_consent_internal",
    "ensure_subscribe",
    "add_to_chats",
];

/// Yes/No questions. A checkbox cannot tell "no" from "not answered", so
/// these are asked as radio buttons and turned back into booleans in `clean`.
pub const BOOLEAN_CHOICES: &[&str] = &[
    "photo_video_consent_external_group",
    "photo_video_consent_external",
    "photo_video_consent_internal",
    "is_student",
];

pub const DATE_OF_BIRTH_FORMAT: &str = "%d-%m-%Y";

const ADD_TO_CHATS_LABEL: &str = "I hereby give permission to add me to the announcement WhatsApp \
    group chats of Vokollage, Ensuite, and/or Auletes when I join those sub-associations (as \
    indicated in the previous question).";
const ADD_TO_CHATS_HELP: &str = "When being part of the choir or orchestras, it is important to \
    join those group chats to receive (last minute) announcements with information about \
    rehearsals and concerts. Please send an email to \
    <a href='mailto:secretary@esmgquadrivium.nl'>secretary@esmgquadrivium.nl</a> directly after \
    filling in this form if you wish to withdraw your consent.";
const ENSURE_SUBSCRIBE_LABEL: &str = "What are your intentions for filling in this form?";
const ENSURE_SUBSCRIBE_HELP: &str = "Please fill in the other form if you are interested in \
    Quadrivium and want to receive some more information.";
const EXTERNAL_GROUP_HELP: &str = "By 'group’ we mean large groups, such as pictures of a full \
    orchestra or choir during a concert.";

/// Public form to request membership.
pub struct SubscribeForm {
    pub fields: Fields,
}

impl SubscribeForm {
    pub fn new() -> Self {
        let mut fields = Fields::new(
            FIELDS
                .iter()
                .filter_map(|name| declared_field(name).or_else(|| request::form_field(name)))
                .collect(),
        );
        populate_boolean_fields(&mut fields);
        if let Some(date) = fields.get_mut("date_of_birth") {
            date.kind = FieldKind::Date { input_formats: vec![DATE_OF_BIRTH_FORMAT] };
        }
        fields.require(REQUIRED);
        Self { fields }
    }

    /// Per-field cleaning followed by the whole-form step that turns the
    /// Yes/No answers into booleans.
    pub fn full_clean(&self, data: &FormData) -> (CleanedData, FormErrors) {
        let (mut cleaned, errors) = clean_fields(&self.fields, data);
        for &name in BOOLEAN_CHOICES {
            if let Some(Value::Text(answer)) = cleaned.get(name) {
                let yes = answer == "Yes";
                cleaned.insert(name, Value::Bool(yes));
            }
        }
        (cleaned, errors)
    }

    pub fn clean(&self, data: &FormData) -> Cleaned<NewMembershipRequest> {
        let (mut cleaned, errors) = self.full_clean(data);
        errors.into_result(())?;
        Ok(NewMembershipRequest {
            first_name: cleaned.take_text("first_name"),
            last_name: cleaned.take_text("last_name"),
            initials: cleaned.take_text("initials"),
            email: cleaned.take_text("email"),
            phone_number: cleaned.take_text("phone_number"),
            street: cleaned.take_text("street"),
            postal_code: cleaned.take_text("postal_code"),
            city: cleaned.take_text("city"),
            country: cleaned.take_text("country"),
            gender: cleaned.take_text("gender"),
            date_of_birth: cleaned.take_date("date_of_birth"),
            preferred_language: cleaned.take_text("preferred_language"),
            field_of_study: cleaned.take_opt_text("field_of_study"),
            is_student: cleaned.take_bool("is_student"),
            iban: cleaned.take_opt_text("iban"),
            tue_card_number: cleaned.take_opt_text("tue_card_number"),
            remarks: cleaned.take_opt_text("remarks"),
            sub_association: cleaned.take_opt_text("sub_association"),
            instruments: cleaned.take_text("instruments"),
            photo_video_consent_external_group: cleaned
                .take_bool("photo_video_consent_external_group"),
            photo_video_consent_external: cleaned.take_bool("photo_video_consent_external"),
            photo_video_consent_internal: cleaned.take_bool("photo_video_consent_internal"),
        })
    }
}

impl Default for SubscribeForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields this form defines itself instead of taking the table's default.
fn declared_field(name: &str) -> Option<FieldSpec> {
    let spec = match name {
        // Radio buttons: no "---------" option to leave these unset.
        "preferred_language" => FieldSpec::choice(
            "preferred_language",
            "Preferred language",
            choices(PREFERRED_LANGUAGES),
        )
        .widget(Widget::RadioSelect),
        "gender" => {
            let options = choices(GENDER_CHOICES);
            FieldSpec::choice("gender", "Gender", options).widget(Widget::RadioSelect)
        }
        // Must-tick boxes that are not stored.
        "add_to_chats" => FieldSpec::multiple_choice(
            "add_to_chats",
            ADD_TO_CHATS_LABEL,
            choices(&[("True", "Yes")]),
        )
        .help(ADD_TO_CHATS_HELP),
        "ensure_subscribe" => FieldSpec::multiple_choice(
            "ensure_subscribe",
            ENSURE_SUBSCRIBE_LABEL,
            choices(&[("True", "I want to be subscribed to Quadrivium")]),
        )
        .help(ENSURE_SUBSCRIBE_HELP),
        _ => return None,
    };
    Some(spec)
}

/// Replace the boolean checkboxes by Yes/No radio questions. The consent
/// questions are labelled with the column's explanation.
fn populate_boolean_fields(fields: &mut Fields) {
    for &name in BOOLEAN_CHOICES {
        let Some(current) = fields.get(name) else {
            continue;
        };
        let label = match name {
            "is_student" => current.label.clone(),
            _ => current.help_text.clone().unwrap_or_else(|| current.label.clone()),
        };
        let mut spec = FieldSpec::choice(name, &label, choices(&[("Yes", "Yes"), ("No", "No")]))
            .widget(Widget::RadioSelect);
        if name == "photo_video_consent_external_group" {
            spec = spec.help(EXTERNAL_GROUP_HELP);
        }
        fields.replace(spec);
    }
}

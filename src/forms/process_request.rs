use super::{Cleaned, FieldError, FieldSpec, Fields, FormData, Media, Widget, clean_fields};
use crate::auth::validate;
use crate::errors::AppError;
use crate::models::instrument::{self, Instrument};
use crate::models::person;
use crate::models::user::AccountLookup;

pub const USERNAME_TAKEN: &str =
    "A user with this username already exists. Please provide an unused username.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMembershipRequest {
    pub username: String,
    pub person_id: String,
    pub instruments: Vec<i64>,
}

/// Admin form that provisions an account for a membership request.
pub struct ProcessMembershipRequestForm<'a> {
    pub fields: Fields,
    accounts: &'a dyn AccountLookup,
}

impl<'a> ProcessMembershipRequestForm<'a> {
    pub fn new(instruments: &[Instrument], accounts: &'a dyn AccountLookup) -> Self {
        let fields = Fields::new(vec![
            FieldSpec::char("username", "Username", validate::USERNAME_MAX_LEN)
                .validator(validate::validate_username),
            FieldSpec::char("person_id", "Person ID", 64),
            FieldSpec::model_multiple_choice(
                "instruments",
                "Instruments",
                instrument::as_choices(instruments),
            )
            .required(false)
            .widget(Widget::FilteredSelectMultiple {
                verbose_name: "Instruments",
                is_stacked: false,
            }),
        ]);
        Self { fields, accounts }
    }

    /// Assets of the dual-list instrument chooser.
    pub fn media() -> Media {
        Media {
            css: vec!["admin/css/widgets.css", "admin/css/forms.css"],
            js: vec![
                "admin/js/vendor/jquery/jquery.js",
                "admin/js/jquery.init.js",
                "admin/js/admin/RelatedObjectLookups.js",
            ],
        }
    }

    pub async fn clean(
        &self,
        data: &FormData,
    ) -> Result<Cleaned<ProcessMembershipRequest>, AppError> {
        let (mut cleaned, mut errors) = clean_fields(&self.fields, data);

        let username = cleaned.take_text("username");
        if !username.is_empty() {
            if let Some(err) = self.clean_username(&username).await? {
                errors.add("username", err);
            }
        }

        let person_id = cleaned.take_text("person_id");
        if !person_id.is_empty() {
            if let Some(err) = person::validate_person_id_unique(self.accounts, &person_id).await? {
                errors.add("person_id", err);
            }
        }

        Ok(errors.into_result(ProcessMembershipRequest {
            username,
            person_id,
            instruments: cleaned.take_ids("instruments"),
        }))
    }

    async fn clean_username(&self, username: &str) -> Result<Option<FieldError>, AppError> {
        if self.accounts.username_exists(username).await? {
            return Ok(Some(FieldError::new("username_taken", USERNAME_TAKEN)));
        }
        Ok(None)
    }
}

//! Form definitions and the small amount of machinery they share.
//!
//! A form is an ordered list of [`FieldSpec`]s. Binding submitted
//! [`FormData`] runs each field's own cleaning ([`clean_fields`]), then the
//! form's per-field hooks and whole-form checks, and yields either a typed
//! cleaned value or [`FormErrors`]. Forms whose checks need the database or
//! the directory return `Result<Cleaned<T>, AppError>`: the outer error is an
//! infrastructure failure, the inner one a user mistake to show on the page.

pub mod data;
pub mod fields;
pub mod password_change;
pub mod process_request;
pub mod profile;
pub mod subscribe;

pub use data::FormData;
pub use fields::{
    Choice, CleanedData, FieldKind, FieldSpec, Fields, Value, Widget, choices, clean_fields,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn required() -> Self {
        Self::new("required", "This field is required.")
    }

    pub fn invalid_choice(value: &str) -> Self {
        Self::new(
            "invalid_choice",
            format!("Select a valid choice. {value} is not one of the available choices."),
        )
    }
}

/// Validation errors of one submission, grouped by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: Vec<(String, Vec<FieldError>)>,
    non_field: Vec<FieldError>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, err: FieldError) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, errs)) => errs.push(err),
            None => self.fields.push((field.to_string(), vec![err])),
        }
    }

    pub fn add_non_field(&mut self, err: FieldError) {
        self.non_field.push(err);
    }

    pub fn get(&self, field: &str) -> &[FieldError] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, errs)| errs.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn codes(&self, field: &str) -> Vec<&'static str> {
        self.get(field).iter().map(|e| e.code).collect()
    }

    pub fn non_field(&self) -> &[FieldError] {
        &self.non_field
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Cleaned<T> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

pub type Cleaned<T> = Result<T, FormErrors>;

/// Extra stylesheets and scripts a form's widgets need on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
    pub css: Vec<&'static str>,
    pub js: Vec<&'static str>,
}

/// A field ready for a template: definition, current value(s), errors.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: &'static str,
    pub label: String,
    pub help_text: Option<String>,
    pub required: bool,
    /// Template switch: text, password, email, date, textarea, checkbox,
    /// select, multiselect, radio, checkboxes or filtered.
    pub widget: &'static str,
    pub value: String,
    pub checked: bool,
    pub options: Vec<BoundOption>,
    pub data_attrs: Vec<(&'static str, String)>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BoundOption {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

/// Pair every field with the values in `data` and its errors.
pub fn bind(fields: &Fields, data: &FormData, errors: &FormErrors) -> Vec<BoundField> {
    fields
        .iter()
        .map(|field| {
            let selected = data.get_all(field.name);
            let mut options: Vec<BoundOption> = field
                .choices()
                .iter()
                .map(|c| BoundOption {
                    value: c.value.clone(),
                    label: c.label.clone(),
                    checked: selected.contains(&c.value.as_str()),
                })
                .collect();

            let mut data_attrs = vec![];
            let widget = match &field.widget {
                Widget::TextInput => "text",
                Widget::PasswordInput => "password",
                Widget::EmailInput => "email",
                Widget::DateInput => "date",
                Widget::Textarea => "textarea",
                Widget::CheckboxInput => "checkbox",
                Widget::Select => {
                    options.insert(0, BoundOption {
                        value: String::new(),
                        label: "---------".to_string(),
                        checked: selected.iter().all(|v| v.is_empty()),
                    });
                    "select"
                }
                Widget::SelectMultiple => "multiselect",
                Widget::RadioSelect => "radio",
                Widget::CheckboxSelectMultiple => "checkboxes",
                Widget::FilteredSelectMultiple { verbose_name, is_stacked } => {
                    data_attrs.push(("data-field-name", verbose_name.to_string()));
                    data_attrs.push(("data-is-stacked", u8::from(*is_stacked).to_string()));
                    "filtered"
                }
            };

            // Passwords are never echoed back.
            let value = match field.widget {
                Widget::PasswordInput => String::new(),
                _ => data.get(field.name).to_string(),
            };
            let checked = !matches!(data.get(field.name), "" | "false" | "False" | "0");

            BoundField {
                name: field.name,
                label: field.label.clone(),
                help_text: field.help_text.clone(),
                required: field.required,
                widget,
                value,
                checked,
                options,
                data_attrs,
                errors: errors.get(field.name).iter().map(|e| e.message.clone()).collect(),
            }
        })
        .collect()
}

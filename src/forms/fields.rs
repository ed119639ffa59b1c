use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{FieldError, FormData, FormErrors};
use crate::auth::validate;

/// Date formats accepted when a date field does not restrict them.
pub const DEFAULT_DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

pub fn choices(pairs: &[(&str, &str)]) -> Vec<Choice> {
    pairs.iter().map(|(v, l)| Choice::new(*v, *l)).collect()
}

/// What a field turns its submitted text into.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Char { max_length: Option<usize>, strip: bool },
    Email,
    Date { input_formats: Vec<&'static str> },
    Boolean,
    Choice(Vec<Choice>),
    MultipleChoice(Vec<Choice>),
    /// Multi-select over database rows; choice values are primary keys.
    ModelMultipleChoice(Vec<Choice>),
}

/// How a field is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    TextInput,
    PasswordInput,
    EmailInput,
    DateInput,
    Textarea,
    CheckboxInput,
    Select,
    SelectMultiple,
    RadioSelect,
    CheckboxSelectMultiple,
    /// Dual-list chooser of the admin site.
    FilteredSelectMultiple { verbose_name: &'static str, is_stacked: bool },
}

pub type Validator = fn(&str) -> Option<FieldError>;

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: String,
    pub help_text: Option<String>,
    pub required: bool,
    pub kind: FieldKind,
    pub widget: Widget,
    pub validators: Vec<Validator>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &str, kind: FieldKind, widget: Widget) -> Self {
        Self {
            name,
            label: label.to_string(),
            help_text: None,
            required: true,
            kind,
            widget,
            validators: vec![],
        }
    }

    pub fn char(name: &'static str, label: &str, max_length: usize) -> Self {
        let kind = FieldKind::Char { max_length: Some(max_length), strip: true };
        Self::new(name, label, kind, Widget::TextInput)
    }

    pub fn text(name: &'static str, label: &str) -> Self {
        let kind = FieldKind::Char { max_length: None, strip: true };
        Self::new(name, label, kind, Widget::Textarea)
    }

    /// Password inputs keep surrounding whitespace.
    pub fn password(name: &'static str, label: &str) -> Self {
        let kind = FieldKind::Char { max_length: None, strip: false };
        Self::new(name, label, kind, Widget::PasswordInput)
    }

    pub fn email(name: &'static str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Email, Widget::EmailInput)
    }

    pub fn date(name: &'static str, label: &str) -> Self {
        let kind = FieldKind::Date { input_formats: DEFAULT_DATE_INPUT_FORMATS.to_vec() };
        Self::new(name, label, kind, Widget::DateInput)
    }

    /// Unchecked boxes are not submitted at all, so a plain checkbox can
    /// only be optional or "must be ticked".
    pub fn boolean(name: &'static str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Boolean, Widget::CheckboxInput).required(false)
    }

    pub fn choice(name: &'static str, label: &str, choices: Vec<Choice>) -> Self {
        Self::new(name, label, FieldKind::Choice(choices), Widget::Select)
    }

    pub fn multiple_choice(name: &'static str, label: &str, choices: Vec<Choice>) -> Self {
        let kind = FieldKind::MultipleChoice(choices);
        Self::new(name, label, kind, Widget::CheckboxSelectMultiple)
    }

    pub fn model_multiple_choice(name: &'static str, label: &str, choices: Vec<Choice>) -> Self {
        let kind = FieldKind::ModelMultipleChoice(choices);
        Self::new(name, label, kind, Widget::SelectMultiple)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn help(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }

    pub fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            FieldKind::Choice(c)
            | FieldKind::MultipleChoice(c)
            | FieldKind::ModelMultipleChoice(c) => c,
            _ => &[],
        }
    }

    /// Turn the submitted value(s) of this field into a cleaned value.
    pub fn clean(&self, data: &FormData) -> Result<Value, FieldError> {
        let value = self.to_value(data)?;
        if let Value::Text(text) = &value {
            if !text.is_empty() {
                if let Some(err) = self.validators.iter().find_map(|v| v(text)) {
                    return Err(err);
                }
            }
        }
        Ok(value)
    }

    fn to_value(&self, data: &FormData) -> Result<Value, FieldError> {
        match &self.kind {
            FieldKind::Char { max_length, strip } => {
                let raw = data.get(self.name);
                let text = if *strip { raw.trim() } else { raw };
                if text.is_empty() {
                    return self.empty(Value::Text(String::new()));
                }
                if let Some(max) = max_length {
                    let len = text.chars().count();
                    if len > *max {
                        let message = format!(
                            "Ensure this value has at most {max} characters (it has {len})."
                        );
                        return Err(FieldError::new("max_length", message));
                    }
                }
                Ok(Value::Text(text.to_string()))
            }
            FieldKind::Email => {
                let text = data.get(self.name).trim();
                if text.is_empty() {
                    return self.empty(Value::Text(String::new()));
                }
                match validate::validate_email(text) {
                    Some(err) => Err(err),
                    None => Ok(Value::Text(text.to_string())),
                }
            }
            FieldKind::Date { input_formats } => {
                let text = data.get(self.name).trim();
                if text.is_empty() {
                    return self.empty(Value::Date(None));
                }
                input_formats
                    .iter()
                    .filter(|fmt| matches_shape(text, fmt))
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                    .map(|d| Value::Date(Some(d)))
                    .ok_or_else(|| FieldError::new("invalid", "Enter a valid date."))
            }
            FieldKind::Boolean => {
                let raw = data.get(self.name);
                let checked = !matches!(raw, "" | "false" | "False" | "0");
                if !checked && self.required {
                    return Err(FieldError::required());
                }
                Ok(Value::Bool(checked))
            }
            FieldKind::Choice(choices) => {
                let text = data.get(self.name).trim();
                if text.is_empty() {
                    return self.empty(Value::Text(String::new()));
                }
                if !choices.iter().any(|c| c.value == text) {
                    return Err(FieldError::invalid_choice(text));
                }
                Ok(Value::Text(text.to_string()))
            }
            FieldKind::MultipleChoice(choices) => {
                let values = non_empty(data.get_all(self.name));
                if values.is_empty() {
                    return self.empty(Value::List(vec![]));
                }
                if let Some(bad) = values.iter().find(|v| !choices.iter().any(|c| c.value == **v)) {
                    return Err(FieldError::invalid_choice(bad));
                }
                Ok(Value::List(values.into_iter().map(String::from).collect()))
            }
            FieldKind::ModelMultipleChoice(choices) => {
                let values = non_empty(data.get_all(self.name));
                if values.is_empty() {
                    return self.empty(Value::Ids(vec![]));
                }
                let mut ids = Vec::with_capacity(values.len());
                for v in values {
                    let id: i64 = v.parse().map_err(|_| {
                        FieldError::new("invalid_pk_value", format!("“{v}” is not a valid value."))
                    })?;
                    if !choices.iter().any(|c| c.value == v) {
                        return Err(FieldError::invalid_choice(v));
                    }
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Ok(Value::Ids(ids))
            }
        }
    }

    fn empty(&self, value: Value) -> Result<Value, FieldError> {
        if self.required {
            Err(FieldError::required())
        } else {
            Ok(value)
        }
    }
}

/// chrono's `%Y` takes any number of digits and a sign. Dates are only
/// accepted with four year digits and the separators of the format.
fn matches_shape(text: &str, fmt: &str) -> bool {
    let mut specifiers = vec![];
    let mut literals = vec![];
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => specifiers.extend(chars.next()),
            other => literals.push(other),
        }
    }
    if !text.chars().all(|c| c.is_ascii_digit() || literals.contains(&c)) {
        return false;
    }
    let runs = text.split(|c: char| !c.is_ascii_digit()).filter(|r| !r.is_empty());
    specifiers
        .iter()
        .zip(runs)
        .all(|(spec, run)| *spec != 'Y' || run.len() == 4)
}

fn non_empty(values: Vec<&str>) -> Vec<&str> {
    values.into_iter().map(str::trim).filter(|v| !v.is_empty()).collect()
}

/// Ordered set of fields making up a form.
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<FieldSpec>);

impl Fields {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        Self(specs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|f| f.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.0.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSpec> {
        self.0.iter_mut().find(|f| f.name == name)
    }

    /// Mark the named fields required whatever their defaults were.
    pub fn require(&mut self, names: &[&str]) {
        for name in names {
            debug_assert!(self.get(name).is_some(), "no field named {name}");
            if let Some(field) = self.get_mut(name) {
                field.required = true;
            }
        }
    }

    /// Swap in a field definition, keeping the position of the one it replaces.
    pub fn replace(&mut self, spec: FieldSpec) {
        match self.0.iter().position(|f| f.name == spec.name) {
            Some(i) => self.0[i] = spec,
            None => self.0.push(spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Date(Option<NaiveDate>),
    List(Vec<String>),
    Ids(Vec<i64>),
}

/// Per-field cleaned values of a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedData(BTreeMap<&'static str, Value>);

impl CleanedData {
    pub fn insert(&mut self, name: &'static str, value: Value) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn take_text(&mut self, name: &str) -> String {
        match self.0.remove(name) {
            Some(Value::Text(s)) => s,
            _ => String::new(),
        }
    }

    /// Text value, with "" mapped to `None` for nullable columns.
    pub fn take_opt_text(&mut self, name: &str) -> Option<String> {
        Some(self.take_text(name)).filter(|s| !s.is_empty())
    }

    pub fn take_bool(&mut self, name: &str) -> bool {
        matches!(self.0.remove(name), Some(Value::Bool(true)))
    }

    pub fn take_date(&mut self, name: &str) -> Option<NaiveDate> {
        match self.0.remove(name) {
            Some(Value::Date(d)) => d,
            _ => None,
        }
    }

    pub fn take_ids(&mut self, name: &str) -> Vec<i64> {
        match self.0.remove(name) {
            Some(Value::Ids(ids)) => ids,
            _ => vec![],
        }
    }
}

/// Run every field's own cleaning. Fields that fail are left out of the
/// cleaned data and reported in the errors.
pub fn clean_fields(fields: &Fields, data: &FormData) -> (CleanedData, FormErrors) {
    let mut cleaned = CleanedData::default();
    let mut errors = FormErrors::default();
    for field in fields.iter() {
        match field.clean(data) {
            Ok(value) => cleaned.insert(field.name, value),
            Err(err) => errors.add(field.name, err),
        }
    }
    (cleaned, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn char_field_trims_and_requires() {
        let f = FieldSpec::char("city", "City", 10);
        assert_eq!(
            f.clean(&data(&[("city", "  Eindhoven ")])),
            Ok(Value::Text("Eindhoven".into()))
        );
        assert_eq!(f.clean(&data(&[("city", "   ")])).unwrap_err().code, "required");
        assert_eq!(
            f.clean(&data(&[("city", "Sint-Oedenrode")])).unwrap_err().code,
            "max_length"
        );
    }

    #[test]
    fn optional_char_field_accepts_missing() {
        let f = FieldSpec::char("iban", "IBAN", 34).required(false);
        assert_eq!(f.clean(&FormData::default()), Ok(Value::Text(String::new())));
    }

    #[test]
    fn password_field_keeps_whitespace() {
        let f = FieldSpec::password("old_password", "Old password");
        assert_eq!(f.clean(&data(&[("old_password", " pw ")])), Ok(Value::Text(" pw ".into())));
    }

    #[test]
    fn date_field_honours_input_formats() {
        let mut f = FieldSpec::date("date_of_birth", "Date of birth");
        f.kind = FieldKind::Date { input_formats: vec!["%d-%m-%Y"] };
        let expected = NaiveDate::from_ymd_opt(1998, 4, 15);
        assert_eq!(f.clean(&data(&[("date_of_birth", "15-04-1998")])), Ok(Value::Date(expected)));
        let err = f.clean(&data(&[("date_of_birth", "1998-04-15")])).unwrap_err();
        assert_eq!(err.code, "invalid");
    }

    #[test]
    fn date_field_wants_four_year_digits() {
        let mut f = FieldSpec::date("date_of_birth", "Date of birth");
        f.kind = FieldKind::Date { input_formats: vec!["%d-%m-%Y"] };
        for typo in ["15-03-01", "15-03-201", "15-03-+2001", "15-03-20011"] {
            let err = f.clean(&data(&[("date_of_birth", typo)])).unwrap_err();
            assert_eq!(err.code, "invalid", "{typo}");
        }
        assert_eq!(
            f.clean(&data(&[("date_of_birth", "5-3-2001")])),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2001, 3, 5)))
        );
    }

    #[test]
    fn default_formats_keep_two_digit_years() {
        let f = FieldSpec::date("d", "Date");
        assert_eq!(
            f.clean(&data(&[("d", "04/15/98")])),
            Ok(Value::Date(NaiveDate::from_ymd_opt(1998, 4, 15)))
        );
        assert_eq!(
            f.clean(&data(&[("d", "1998-04-15")])),
            Ok(Value::Date(NaiveDate::from_ymd_opt(1998, 4, 15)))
        );
    }

    #[test]
    fn choice_field_rejects_unknown_values() {
        let options = choices(&[("male", "Male"), ("female", "Female")]);
        let f = FieldSpec::choice("gender", "Gender", options);
        assert_eq!(f.clean(&data(&[("gender", "female")])), Ok(Value::Text("female".into())));
        let err = f.clean(&data(&[("gender", "robot")])).unwrap_err();
        assert_eq!(err.code, "invalid_choice");
        assert!(err.message.contains("robot"));
    }

    #[test]
    fn multiple_choice_collects_all_values() {
        let f = FieldSpec::multiple_choice("subs", "Subs", choices(&[("a", "A"), ("b", "B")]));
        assert_eq!(
            f.clean(&data(&[("subs", "a"), ("subs", "b")])),
            Ok(Value::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(f.clean(&FormData::default()).unwrap_err().code, "required");
    }

    #[test]
    fn model_multiple_choice_parses_ids() {
        let options = choices(&[("1", "Violin"), ("2", "Cello")]);
        let f = FieldSpec::model_multiple_choice("instruments", "Instruments", options)
            .required(false);
        assert_eq!(
            f.clean(&data(&[("instruments", "2"), ("instruments", "1"), ("instruments", "2")])),
            Ok(Value::Ids(vec![2, 1]))
        );
        assert_eq!(f.clean(&FormData::default()), Ok(Value::Ids(vec![])));
        assert_eq!(f.clean(&data(&[("instruments", "x")])).unwrap_err().code, "invalid_pk_value");
        assert_eq!(f.clean(&data(&[("instruments", "9")])).unwrap_err().code, "invalid_choice");
    }

    #[test]
    fn required_checkbox_must_be_ticked() {
        let f = FieldSpec::boolean("agree", "Agree").required(true);
        assert_eq!(f.clean(&data(&[("agree", "on")])), Ok(Value::Bool(true)));
        assert_eq!(f.clean(&FormData::default()).unwrap_err().code, "required");
    }

    #[test]
    fn require_and_replace_keep_order() {
        let mut fields = Fields::new(vec![
            FieldSpec::char("a", "A", 5).required(false),
            FieldSpec::char("b", "B", 5).required(false),
        ]);
        fields.require(&["b"]);
        fields.replace(FieldSpec::email("a", "A"));
        assert_eq!(fields.names(), vec!["a", "b"]);
        assert!(fields.get("b").is_some_and(|f| f.required));
        assert!(matches!(fields.get("a").map(|f| &f.kind), Some(FieldKind::Email)));
    }
}

//! Field schemas for the create/edit dialogs and the flat value map they submit.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;
use utils::text::{split_comma_list, split_optional_comma_list};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{label} is required")]
    MissingField { field: String, label: String },
    #[error("{label} must be a whole number, got {value:?}")]
    InvalidNumber {
        field: String,
        label: String,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Number,
    Date,
    Checkbox,
    /// Free text split on `,` into a list.
    CommaList,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Gather the submitted inputs into [`FormValues`].
    ///
    /// Only schema fields are kept. A missing input takes the field default,
    /// then the empty string; an unchecked checkbox reads `"false"`. Required
    /// fields must be non-blank after that.
    pub fn collect(&self, raw: &HashMap<String, String>) -> Result<FormValues, FormError> {
        let mut values = BTreeMap::new();
        for field in &self.fields {
            let submitted = raw.get(field.name).cloned();
            let value = match field.kind {
                FieldKind::Checkbox => match submitted.as_deref() {
                    Some("on") | Some("true") => "true".to_string(),
                    Some(_) => "false".to_string(),
                    None => field.default.clone().unwrap_or_else(|| "false".to_string()),
                },
                _ => submitted
                    .or_else(|| field.default.clone())
                    .unwrap_or_default(),
            };
            if field.required && value.trim().is_empty() {
                return Err(FormError::MissingField {
                    field: field.name.to_string(),
                    label: field.label.to_string(),
                });
            }
            values.insert(field.name.to_string(), value);
        }
        Ok(FormValues {
            values,
            labels: self
                .fields
                .iter()
                .map(|f| (f.name.to_string(), f.label.to_string()))
                .collect(),
        })
    }
}

/// Raw string inputs keyed by field name, as submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormValues {
    values: BTreeMap<String, String>,
    #[serde(skip)]
    labels: BTreeMap<String, String>,
}

impl FormValues {
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// `None` when the input is blank.
    pub fn non_empty(&self, name: &str) -> Option<String> {
        let value = self.get(name);
        (!value.trim().is_empty()).then(|| value.to_string())
    }

    pub fn list(&self, name: &str) -> Vec<String> {
        split_comma_list(self.get(name))
    }

    pub fn optional_list(&self, name: &str) -> Vec<String> {
        split_optional_comma_list(self.get(name))
    }

    pub fn int(&self, name: &str) -> Result<i32, FormError> {
        let value = self.get(name).trim();
        value.parse().map_err(|_| FormError::InvalidNumber {
            field: name.to_string(),
            label: self.labels.get(name).cloned().unwrap_or_else(|| name.to_string()),
            value: value.to_string(),
        })
    }

    /// Like [`FormValues::int`] but a blank input reads as `default`.
    pub fn int_or(&self, name: &str, default: i32) -> Result<i32, FormError> {
        if self.get(name).trim().is_empty() {
            return Ok(default);
        }
        self.int(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == "true"
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::text("name", "Name").required())
            .field(FieldSpec::new("capacity", "Capacity", FieldKind::Number).required())
            .field(FieldSpec::text("tuition", "Tuition").with_default("$300/week"))
            .field(FieldSpec::new("features", "Features", FieldKind::CommaList))
            .field(FieldSpec::new("required", "Required", FieldKind::Checkbox))
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let err = schema()
            .collect(&raw(&[("name", "   "), ("capacity", "12")]))
            .unwrap_err();
        assert_eq!(
            err,
            FormError::MissingField {
                field: "name".to_string(),
                label: "Name".to_string()
            }
        );
    }

    #[test]
    fn defaults_fill_missing_inputs_and_extras_are_dropped() {
        let values = schema()
            .collect(&raw(&[("name", "Preschool"), ("capacity", "16"), ("extra", "x")]))
            .unwrap();
        assert_eq!(values.get("tuition"), "$300/week");
        assert_eq!(values.get("required"), "false");
        assert_eq!(values.get("extra"), "");
        assert_eq!(values.int("capacity").unwrap(), 16);
        assert!(!values.into_map().contains_key("extra"));
    }

    #[test]
    fn comma_lists_keep_trailing_empty_segment() {
        let values = schema()
            .collect(&raw(&[
                ("name", "Toddlers"),
                ("capacity", "12"),
                ("features", "Tummy time, Sensory play,"),
            ]))
            .unwrap();
        assert_eq!(values.list("features"), vec!["Tummy time", "Sensory play", ""]);
        assert_eq!(values.optional_list("tuition"), vec!["$300/week"]);
    }

    #[test]
    fn non_numeric_number_names_the_field() {
        let values = schema()
            .collect(&raw(&[("name", "Toddlers"), ("capacity", "twelve"), ("required", "on")]))
            .unwrap();
        assert!(values.flag("required"));
        let err = values.int("capacity").unwrap_err();
        assert_eq!(err.to_string(), "Capacity must be a whole number, got \"twelve\"");
        assert_eq!(values.int_or("missing", 0).unwrap(), 0);
    }
}

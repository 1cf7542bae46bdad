//! Form definitions backing the console routes.

use std::collections::BTreeMap;

use actix_multipart::form::tempfile::TempFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::domain::file::UploadFile;

pub mod categories;
pub mod users;
pub mod wallpapers;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid category")]
    InvalidCategory,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid slug")]
    InvalidSlug,

    #[error("password is required")]
    PasswordRequired,

    #[error("at least one image is required")]
    NoFiles,

    #[error("failed to read uploaded file: {0}")]
    Upload(String),

    #[error("malformed form body: {0}")]
    Malformed(String),
}

/// Validation messages keyed by form field, rendered next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn validation_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("invalid value ({})", error.code))
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errors) in errors.field_errors() {
            for error in errors {
                fields.add(field.to_string(), validation_message(error));
            }
        }
        fields
    }
}

impl From<&FormError> for FieldErrors {
    fn from(error: &FormError) -> Self {
        let mut fields = FieldErrors::new();
        match error {
            FormError::Validation(errors) => return FieldErrors::from(errors),
            FormError::InvalidCategory => fields.add("category", "Choose a category"),
            FormError::InvalidName => fields.add("name", "Name is required"),
            FormError::InvalidEmail => fields.add("email", "Enter a valid email address"),
            FormError::InvalidSlug => fields.add("slug", "Slug must contain letters or digits"),
            FormError::PasswordRequired => fields.add("password", "Password is required"),
            FormError::NoFiles => fields.add("images", "Select at least one image"),
            FormError::Upload(message) => fields.add("images", message.clone()),
            FormError::Malformed(message) => fields.add("form", message.clone()),
        }
        fields
    }
}

/// Confirmation step of single-row deletes.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: Option<String>,
    /// Query string of the list the delete was started from.
    #[serde(default)]
    pub back: Option<String>,
}

impl ConfirmForm {
    pub fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

/// Selected row ids of a bulk delete. Parsed with `serde_html_form` so the
/// repeated `ids` keys of checkbox lists collect into a vector.
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteForm {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub confirm: Option<String>,
    /// Query string of the list the selection was made on.
    #[serde(default)]
    pub back: Option<String>,
}

impl BulkDeleteForm {
    pub fn parse(body: &str) -> Result<Self, FormError> {
        serde_html_form::from_str(body).map_err(|e| FormError::Malformed(e.to_string()))
    }

    pub fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }

    /// Non-blank ids in submission order without repeats.
    pub fn selected_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Whether a file input was actually used; browsers submit an empty part for
/// untouched inputs.
pub fn is_file_present(file: &TempFile) -> bool {
    file.size > 0 || file.file_name.as_deref().is_some_and(|name| !name.is_empty())
}

/// Reads an uploaded temporary file into memory for forwarding.
pub fn read_upload(file: &TempFile) -> Result<UploadFile, FormError> {
    let bytes = std::fs::read(file.file.path()).map_err(|e| FormError::Upload(e.to_string()))?;

    let file_name = file
        .file_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = file.content_type.as_ref().map(|mime| mime.to_string());

    Ok(UploadFile::new(file_name, content_type, bytes))
}

/// Checkbox inputs only submit a value when ticked.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("on" | "true" | "1" | "yes"))
}

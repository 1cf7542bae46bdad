//! Application user create/edit form.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::file::UploadFile;
use crate::domain::types::{UserEmail, UserName};
use crate::domain::user::{AppUser, NewAppUser, UpdateAppUser, UserRole};
use crate::forms::{FormError, checkbox, is_file_present, read_upload};

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(())
    } else {
        Err(ValidationError::new("password")
            .with_message(format!("Password must be at least {MIN_PASSWORD_LENGTH} characters").into()))
    }
}

fn validate_role(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<UserRole>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("role").with_message("Unknown role".into()))
}

/// Plain user values; passwords are never echoed back into the page.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct AppUserFields {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Blank keeps the current password in edit mode.
    #[serde(skip)]
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[serde(skip)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    pub is_active: bool,
}

impl AppUserFields {
    pub fn from_user(user: &AppUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            is_active: user.is_active,
            ..Default::default()
        }
    }

    pub fn initial() -> Self {
        Self {
            role: UserRole::default().to_string(),
            is_active: true,
            ..Default::default()
        }
    }

    fn parts(&self) -> Result<(UserName, UserEmail, UserRole), FormError> {
        self.validate()?;
        let name = UserName::new(self.name.as_str()).map_err(|_| FormError::InvalidName)?;
        let email = UserEmail::new(self.email.as_str()).map_err(|_| FormError::InvalidEmail)?;
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|e| FormError::Malformed(e.to_string()))?;
        Ok((name, email, role))
    }
}

#[derive(MultipartForm)]
#[multipart(duplicate_field = "deny")]
pub struct AppUserForm {
    pub name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub password: Option<Text<String>>,
    pub password_confirmation: Option<Text<String>>,
    pub role: Option<Text<String>>,
    pub is_active: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub profile_picture: Option<TempFile>,
}

fn text(value: &Option<Text<String>>) -> String {
    value
        .as_ref()
        .map(|t| t.as_str().trim().to_string())
        .unwrap_or_default()
}

impl AppUserForm {
    pub fn fields(&self) -> AppUserFields {
        AppUserFields {
            name: text(&self.name),
            email: text(&self.email),
            // Passwords are taken verbatim.
            password: self.password.as_ref().map(|t| t.0.clone()).unwrap_or_default(),
            password_confirmation: self
                .password_confirmation
                .as_ref()
                .map(|t| t.0.clone())
                .unwrap_or_default(),
            role: text(&self.role),
            is_active: checkbox(self.is_active.as_ref().map(|t| t.as_str())),
        }
    }

    fn picture(&self) -> Result<Option<UploadFile>, FormError> {
        match &self.profile_picture {
            Some(file) if is_file_present(file) => Ok(Some(read_upload(file)?)),
            _ => Ok(None),
        }
    }
}

impl TryFrom<&AppUserForm> for NewAppUser {
    type Error = FormError;

    fn try_from(form: &AppUserForm) -> Result<Self, Self::Error> {
        let fields = form.fields();
        let (name, email, role) = fields.parts()?;
        if fields.password.is_empty() {
            return Err(FormError::PasswordRequired);
        }

        Ok(NewAppUser {
            name,
            email,
            password: fields.password,
            role,
            is_active: fields.is_active,
            profile_picture: form.picture()?,
        })
    }
}

impl TryFrom<&AppUserForm> for UpdateAppUser {
    type Error = FormError;

    fn try_from(form: &AppUserForm) -> Result<Self, Self::Error> {
        let fields = form.fields();
        let (name, email, role) = fields.parts()?;

        Ok(UpdateAppUser {
            name,
            email,
            password: (!fields.password.is_empty()).then_some(fields.password),
            role,
            is_active: fields.is_active,
            profile_picture: form.picture()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FieldErrors;

    fn fields(password: &str, confirmation: &str) -> AppUserFields {
        AppUserFields {
            name: "Jane".to_string(),
            email: "Jane@Example.com".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
            role: "editor".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn valid_fields_pass() {
        let (name, email, role) = fields("secret1", "secret1").parts().unwrap();
        assert_eq!(name.as_str(), "Jane");
        assert_eq!(email.as_str(), "jane@example.com");
        assert_eq!(role, UserRole::Editor);
    }

    #[test]
    fn short_password_is_rejected() {
        let err = fields("12345", "12345").parts().unwrap_err();
        let errors = FieldErrors::from(&err);
        assert_eq!(
            errors.get("password"),
            Some(&["Password must be at least 6 characters".to_string()][..])
        );
    }

    #[test]
    fn confirmation_must_match() {
        let err = fields("secret1", "secret2").parts().unwrap_err();
        let errors = FieldErrors::from(&err);
        assert_eq!(
            errors.get("password_confirmation"),
            Some(&["Passwords do not match".to_string()][..])
        );
    }

    #[test]
    fn invalid_email_and_role_are_field_errors() {
        let mut user = fields("", "");
        user.email = "not-an-email".to_string();
        user.role = "root".to_string();

        let errors = FieldErrors::from(&user.parts().unwrap_err());
        assert!(errors.get("email").is_some());
        assert_eq!(errors.get("role"), Some(&["Unknown role".to_string()][..]));
    }

    #[test]
    fn blank_password_is_allowed_at_field_level() {
        assert!(fields("", "").parts().is_ok());
    }

    #[test]
    fn fields_never_serialize_passwords() {
        let value = serde_json::to_value(fields("secret1", "secret1")).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("password_confirmation").is_none());
        assert_eq!(value["role"], "editor");
    }
}

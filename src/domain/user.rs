use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::file::UploadFile;
use crate::domain::types::{TypeConstraintError, UserEmail, UserId, UserName};

fn default_active() -> bool {
    true
}

/// Application (mobile app) user as returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    #[default]
    User,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [Self::Admin, Self::Editor, Self::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::User => "user",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "user" => Ok(UserRole::User),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown role '{other}'"
            ))),
        }
    }
}

/// Multipart payload for `POST /users`.
#[derive(Clone, Debug)]
pub struct NewAppUser {
    pub name: UserName,
    pub email: UserEmail,
    pub password: String,
    pub role: UserRole,
    pub is_active: bool,
    pub profile_picture: Option<UploadFile>,
}

/// Multipart payload for `PUT /users/:id`. `password` is only sent when changed.
#[derive(Clone, Debug)]
pub struct UpdateAppUser {
    pub name: UserName,
    pub email: UserEmail,
    pub password: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub profile_picture: Option<UploadFile>,
}

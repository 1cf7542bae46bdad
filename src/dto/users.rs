//! DTOs used by the application user screens.

use serde::Serialize;

use crate::domain::user::{AppUser, UserRole};
use crate::dto::{FormMode, ListPageData};
use crate::forms::FieldErrors;
use crate::forms::users::AppUserFields;

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub profile_picture: Option<String>,
    pub created_at: Option<String>,
}

impl From<AppUser> for UserRow {
    fn from(user: AppUser) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            is_active: user.is_active,
            profile_picture: user.profile_picture,
            created_at: user.created_at.map(|at| at.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersPageData {
    pub list: ListPageData<UserRow>,
}

#[derive(Debug, Serialize)]
pub struct UserFormData {
    pub mode: FormMode,
    pub fields: AppUserFields,
    pub roles: Vec<&'static str>,
    pub errors: FieldErrors,
    pub profile_picture: Option<String>,
}

impl UserFormData {
    pub fn new(mode: FormMode, fields: AppUserFields) -> Self {
        Self {
            mode,
            fields,
            roles: UserRole::ALL.iter().map(|r| r.as_str()).collect(),
            errors: FieldErrors::new(),
            profile_picture: None,
        }
    }
}

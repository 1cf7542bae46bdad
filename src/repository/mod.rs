//! Remote catalog access.
//!
//! The reader/writer traits are the seam between the services and the REST
//! backend. [`HttpRepository`] implements all of them over `reqwest`; tests
//! substitute in-memory doubles or the `mockall` mocks from [`mock`].

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::category::{Category, CategoryPayload};
use crate::domain::page::Page;
use crate::domain::types::{CategoryId, UserId, WallpaperId};
use crate::domain::user::{AppUser, NewAppUser, UpdateAppUser};
use crate::domain::wallpaper::{NewWallpaper, UpdateWallpaper, Wallpaper};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::{ApiConfig, HttpRepository};

/// Query string of `GET /wallpapers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WallpaperListQuery {
    pub page: usize,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl WallpaperListQuery {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Query string of `GET /categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Upper bound used when every category is needed to build option lists.
pub const ALL_CATEGORIES_LIMIT: usize = 1000;

impl CategoryListQuery {
    /// Every category in one page, as needed by select inputs.
    pub fn all() -> Self {
        Self {
            limit: Some(ALL_CATEGORIES_LIMIT),
            ..Default::default()
        }
    }

    /// Every active category.
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::all()
        }
    }

    pub fn paginate(mut self, page: usize, limit: usize) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Query string of `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserListQuery {
    pub page: usize,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl UserListQuery {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

#[async_trait]
pub trait WallpaperReader {
    async fn list_wallpapers(&self, query: WallpaperListQuery)
    -> RepositoryResult<Page<Wallpaper>>;
    async fn get_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<Option<Wallpaper>>;
}

#[async_trait]
pub trait WallpaperWriter {
    async fn create_wallpaper(&self, wallpaper: &NewWallpaper) -> RepositoryResult<Wallpaper>;
    async fn update_wallpaper(
        &self,
        id: &WallpaperId,
        updates: &UpdateWallpaper,
    ) -> RepositoryResult<Wallpaper>;
    async fn delete_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CategoryReader {
    async fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Page<Category>>;
    async fn get_category(&self, id: &CategoryId) -> RepositoryResult<Option<Category>>;
}

#[async_trait]
pub trait CategoryWriter {
    async fn create_category(&self, category: &CategoryPayload) -> RepositoryResult<Category>;
    async fn update_category(
        &self,
        id: &CategoryId,
        updates: &CategoryPayload,
    ) -> RepositoryResult<Category>;
    async fn delete_category(&self, id: &CategoryId) -> RepositoryResult<()>;
    async fn bulk_delete_categories(&self, ids: &[CategoryId]) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserReader {
    async fn list_users(&self, query: UserListQuery) -> RepositoryResult<Page<AppUser>>;
    async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<AppUser>>;
}

#[async_trait]
pub trait UserWriter {
    async fn create_user(&self, user: &NewAppUser) -> RepositoryResult<AppUser>;
    async fn update_user(&self, id: &UserId, updates: &UpdateAppUser)
    -> RepositoryResult<AppUser>;
    async fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
}

//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::category::{Category, CategoryPayload};
use crate::domain::page::Page;
use crate::domain::types::{CategoryId, UserId, WallpaperId};
use crate::domain::user::{AppUser, NewAppUser, UpdateAppUser};
use crate::domain::wallpaper::{NewWallpaper, UpdateWallpaper, Wallpaper};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, UserListQuery, UserReader, UserWriter,
    WallpaperListQuery, WallpaperReader, WallpaperWriter,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl WallpaperReader for Repository {
        async fn list_wallpapers(&self, query: WallpaperListQuery) -> RepositoryResult<Page<Wallpaper>>;
        async fn get_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<Option<Wallpaper>>;
    }

    #[async_trait]
    impl WallpaperWriter for Repository {
        async fn create_wallpaper(&self, wallpaper: &NewWallpaper) -> RepositoryResult<Wallpaper>;
        async fn update_wallpaper(
            &self,
            id: &WallpaperId,
            updates: &UpdateWallpaper,
        ) -> RepositoryResult<Wallpaper>;
        async fn delete_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl CategoryReader for Repository {
        async fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Page<Category>>;
        async fn get_category(&self, id: &CategoryId) -> RepositoryResult<Option<Category>>;
    }

    #[async_trait]
    impl CategoryWriter for Repository {
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
    impl UserReader for Repository {
        async fn list_users(&self, query: UserListQuery) -> RepositoryResult<Page<AppUser>>;
        async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<AppUser>>;
    }

    #[async_trait]
    impl UserWriter for Repository {
        async fn create_user(&self, user: &NewAppUser) -> RepositoryResult<AppUser>;
        async fn update_user(&self, id: &UserId, updates: &UpdateAppUser) -> RepositoryResult<AppUser>;
        async fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
    }
}

//! REST backend client implementing the repository traits.
//!
//! Every response is normalized from the backend envelope
//! `{ success, message?, data, pagination?: { total, totalPages } }`. Bodies
//! without an envelope are taken as the record itself.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, CategoryPayload};
use crate::domain::file::UploadFile;
use crate::domain::page::Page;
use crate::domain::types::{CategoryId, UserId, WallpaperId, WallpaperTitle};
use crate::domain::user::{AppUser, NewAppUser, UpdateAppUser};
use crate::domain::wallpaper::{NewWallpaper, UpdateWallpaper, Wallpaper, WallpaperSettings};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, UserListQuery, UserReader, UserWriter,
    WallpaperListQuery, WallpaperReader, WallpaperWriter,
};

/// Connection settings for the catalog backend.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL including the API prefix (e.g. `http://127.0.0.1:5000/api`).
    pub base_url: String,
    /// Optional bearer token forwarded with every request.
    pub token: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            token: None,
            timeout_ms: 30000,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationMeta {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    total_pages: usize,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    message: Option<String>,
    data: Option<T>,
    pagination: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    fn bare(data: Option<T>) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Extracts a human readable message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.trim().to_string())
}

fn file_part(file: &UploadFile) -> RepositoryResult<Part> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match &file.content_type {
        Some(content_type) => Ok(part.mime_str(content_type)?),
        None => Ok(part),
    }
}

fn wallpaper_form(
    title: &WallpaperTitle,
    settings: &WallpaperSettings,
    image: Option<&UploadFile>,
) -> RepositoryResult<Form> {
    let mut form = Form::new()
        .text("title", title.as_str().to_string())
        .text("category", settings.category.as_str().to_string())
        .text("tags", settings.tags.joined())
        .text("format", settings.format.as_str())
        .text("status", settings.status.as_str());

    if let Some(image) = image {
        form = form.part("image", file_part(image)?);
    }

    Ok(form)
}

fn user_form(
    name: &str,
    email: &str,
    password: Option<&str>,
    role: &str,
    is_active: bool,
    picture: Option<&UploadFile>,
) -> RepositoryResult<Form> {
    let mut form = Form::new()
        .text("name", name.to_string())
        .text("email", email.to_string())
        .text("role", role.to_string())
        .text("isActive", is_active.to_string());

    if let Some(password) = password {
        form = form.text("password", password.to_string());
    }

    if let Some(picture) = picture {
        form = form.part("profilePicture", file_part(picture)?);
    }

    Ok(form)
}

#[derive(Serialize)]
struct BulkDeleteBody<'a> {
    ids: &'a [CategoryId],
}

/// `reqwest` backed implementation of every repository trait.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRepository {
    pub fn new(config: ApiConfig) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base_url}{collection}/{id}` with `id` escaped as a single path segment.
    fn record_url(&self, collection: &str, id: &str) -> RepositoryResult<Url> {
        if matches!(id, "." | "..") {
            return Err(RepositoryError::InvalidRequest(format!(
                "{id:?} is not a record id"
            )));
        }
        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| RepositoryError::InvalidRequest(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| {
                RepositoryError::InvalidRequest(format!("{} cannot hold a path", self.base_url))
            })?
            .push(id);
        Ok(url)
    }

    fn send_to<U: IntoUrl + std::fmt::Display>(&self, method: Method, url: U) -> RequestBuilder {
        debug!("{method} {url}");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.send_to(method, self.url(path))
    }

    fn record(
        &self,
        method: Method,
        collection: &str,
        id: &str,
    ) -> RepositoryResult<RequestBuilder> {
        Ok(self.send_to(method, self.record_url(collection, id)?))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> RepositoryResult<Envelope<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound);
        }

        if !status.is_success() {
            return Err(RepositoryError::Request {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Envelope::bare(None));
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let envelope: Envelope<T> = if value.get("success").is_some() || value.get("data").is_some()
        {
            serde_json::from_value(value)?
        } else {
            Envelope::bare(Some(serde_json::from_value(value)?))
        };

        if !envelope.success {
            return Err(RepositoryError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected by the server".to_string()),
            ));
        }

        Ok(envelope)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, request: RequestBuilder) -> RepositoryResult<T> {
        self.execute(request)
            .await?
            .data
            .ok_or_else(|| RepositoryError::Decode("response has no data".to_string()))
    }

    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> RepositoryResult<Option<T>> {
        match self.fetch_one(request).await {
            Ok(value) => Ok(Some(value)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> RepositoryResult<Page<T>> {
        let envelope = self.execute::<Vec<T>>(request).await?;
        let items = envelope.data.unwrap_or_default();

        Ok(match envelope.pagination {
            Some(meta) => Page {
                items,
                total: meta.total,
                total_pages: meta.total_pages,
            },
            None => Page::single(items),
        })
    }

    async fn execute_empty(&self, request: RequestBuilder) -> RepositoryResult<()> {
        self.execute::<serde_json::Value>(request).await.map(|_| ())
    }
}

#[async_trait]
impl WallpaperReader for HttpRepository {
    async fn list_wallpapers(
        &self,
        query: WallpaperListQuery,
    ) -> RepositoryResult<Page<Wallpaper>> {
        self.fetch_page(self.request(Method::GET, "/wallpapers").query(&query))
            .await
    }

    async fn get_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<Option<Wallpaper>> {
        self.fetch_optional(self.record(Method::GET, "/wallpapers", id.as_str())?)
            .await
    }
}

#[async_trait]
impl WallpaperWriter for HttpRepository {
    async fn create_wallpaper(&self, wallpaper: &NewWallpaper) -> RepositoryResult<Wallpaper> {
        let form = wallpaper_form(&wallpaper.title, &wallpaper.settings, Some(&wallpaper.image))?;
        self.fetch_one(self.request(Method::POST, "/wallpapers").multipart(form))
            .await
    }

    async fn update_wallpaper(
        &self,
        id: &WallpaperId,
        updates: &UpdateWallpaper,
    ) -> RepositoryResult<Wallpaper> {
        let form = wallpaper_form(&updates.title, &updates.settings, updates.image.as_ref())?;
        self.fetch_one(
            self.record(Method::PUT, "/wallpapers", id.as_str())?
                .multipart(form),
        )
        .await
    }

    async fn delete_wallpaper(&self, id: &WallpaperId) -> RepositoryResult<()> {
        self.execute_empty(self.record(Method::DELETE, "/wallpapers", id.as_str())?)
            .await
    }
}

#[async_trait]
impl CategoryReader for HttpRepository {
    async fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Page<Category>> {
        self.fetch_page(self.request(Method::GET, "/categories").query(&query))
            .await
    }

    async fn get_category(&self, id: &CategoryId) -> RepositoryResult<Option<Category>> {
        self.fetch_optional(self.record(Method::GET, "/categories", id.as_str())?)
            .await
    }
}

#[async_trait]
impl CategoryWriter for HttpRepository {
    async fn create_category(&self, category: &CategoryPayload) -> RepositoryResult<Category> {
        self.fetch_one(self.request(Method::POST, "/categories").json(category))
            .await
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        updates: &CategoryPayload,
    ) -> RepositoryResult<Category> {
        self.fetch_one(
            self.record(Method::PATCH, "/categories", id.as_str())?
                .json(updates),
        )
        .await
    }

    async fn delete_category(&self, id: &CategoryId) -> RepositoryResult<()> {
        self.execute_empty(self.record(Method::DELETE, "/categories", id.as_str())?)
            .await
    }

    async fn bulk_delete_categories(&self, ids: &[CategoryId]) -> RepositoryResult<()> {
        self.execute_empty(
            self.request(Method::POST, "/categories/bulk-delete")
                .json(&BulkDeleteBody { ids }),
        )
        .await
    }
}

#[async_trait]
impl UserReader for HttpRepository {
    async fn list_users(&self, query: UserListQuery) -> RepositoryResult<Page<AppUser>> {
        self.fetch_page(self.request(Method::GET, "/users").query(&query))
            .await
    }

    async fn get_user(&self, id: &UserId) -> RepositoryResult<Option<AppUser>> {
        self.fetch_optional(self.record(Method::GET, "/users", id.as_str())?)
            .await
    }
}

#[async_trait]
impl UserWriter for HttpRepository {
    async fn create_user(&self, user: &NewAppUser) -> RepositoryResult<AppUser> {
        let form = user_form(
            user.name.as_str(),
            user.email.as_str(),
            Some(user.password.as_str()),
            user.role.as_str(),
            user.is_active,
            user.profile_picture.as_ref(),
        )?;
        self.fetch_one(self.request(Method::POST, "/users").multipart(form))
            .await
    }

    async fn update_user(
        &self,
        id: &UserId,
        updates: &UpdateAppUser,
    ) -> RepositoryResult<AppUser> {
        let form = user_form(
            updates.name.as_str(),
            updates.email.as_str(),
            updates.password.as_deref(),
            updates.role.as_str(),
            updates.is_active,
            updates.profile_picture.as_ref(),
        )?;
        self.fetch_one(
            self.record(Method::PUT, "/users", id.as_str())?
                .multipart(form),
        )
        .await
    }

    async fn delete_user(&self, id: &UserId) -> RepositoryResult<()> {
        self.execute_empty(self.record(Method::DELETE, "/users", id.as_str())?)
            .await
    }
}

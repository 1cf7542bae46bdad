//! Services behind the wallpaper screens.

use std::collections::HashMap;

use log::error;

use crate::components::category_picker::CategoryTree;
use crate::components::list_controller::ListState;
use crate::components::upload_queue::UploadQueue;
use crate::domain::types::WallpaperId;
use crate::domain::wallpaper::{Wallpaper, WallpaperStatus};
use crate::dto::wallpapers::{UploadReport, WallpaperFormData, WallpaperRow, WallpapersPageData};
use crate::dto::{BulkDeleteReport, FormMode, ListPageData};
use crate::forms::FieldErrors;
use crate::forms::wallpapers::{EditWallpaperForm, UploadWallpapersForm, WallpaperFields};
use crate::repository::{
    CategoryListQuery, CategoryReader, WallpaperListQuery, WallpaperReader, WallpaperWriter,
};
use crate::services::lists::{SessionLists, load_list};
use crate::services::{ServiceError, ServiceResult};

pub const WALLPAPERS_PATH: &str = "/wallpapers";
/// Column filters of the wallpaper list.
pub const WALLPAPER_FILTERS: [&str; 2] = ["category", "status"];

/// Loads every category; failures degrade to an empty tree so list and form
/// pages still render.
async fn load_tree<R>(repo: &R) -> CategoryTree
where
    R: CategoryReader + ?Sized,
{
    match repo.list_categories(CategoryListQuery::all()).await {
        Ok(page) => CategoryTree::new(page.items),
        Err(err) => {
            error!("Failed to load categories: {err}");
            CategoryTree::default()
        }
    }
}

/// Loads one page of wallpapers for the list screen. `raw_query` is the
/// request's URL query string.
pub async fn list_wallpapers<R>(
    repo: &R,
    lists: &SessionLists,
    raw_query: &str,
) -> WallpapersPageData
where
    R: WallpaperReader + CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    let state = ListState::from_url_query(raw_query, &WALLPAPER_FILTERS, lists.page_size());

    let loaded = load_list(&lists.wallpapers, state, |params| {
        let mut query = WallpaperListQuery::new(params.page, params.limit);
        if let Some(search) = params.search.as_deref() {
            query = query.search(search);
        }
        if let Some(category) = params.filter("category") {
            query = query.category(category);
        }
        if let Some(status) = params.filter("status") {
            query = query.status(status);
        }
        repo.list_wallpapers(query)
    })
    .await;

    let names: HashMap<String, String> = tree
        .options()
        .into_iter()
        .map(|option| (option.id, option.name))
        .collect();

    WallpapersPageData {
        list: ListPageData::new(
            WALLPAPERS_PATH,
            &loaded.state,
            loaded.view,
            loaded.error.map(|e| e.to_string()),
            |wallpaper| WallpaperRow::new(wallpaper, &names),
        ),
        categories: tree.options(),
        statuses: WallpaperStatus::ALL.iter().map(|s| s.as_str()).collect(),
    }
}

/// Data of the batch create screen.
pub async fn load_new_form<R>(repo: &R) -> WallpaperFormData
where
    R: CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    WallpaperFormData::new(FormMode::Create, WallpaperFields::initial()).with_categories(&tree)
}

/// Data of the edit screen. Categories are loaded first so the wallpaper's
/// category can be resolved into the parent/child pair.
pub async fn load_edit_form<R>(repo: &R, id: &str) -> ServiceResult<WallpaperFormData>
where
    R: WallpaperReader + CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    let wallpaper = get_wallpaper(repo, id).await?;

    let mut fields = WallpaperFields::from_wallpaper(&wallpaper);
    if let Some(category) = &wallpaper.category {
        let selection = tree.resolve(category.id());
        fields.parent_category = selection.parent.map(String::from).unwrap_or_default();
        fields.child_category = selection.child.map(String::from).unwrap_or_default();
    }

    let mut data = WallpaperFormData::new(FormMode::Edit(wallpaper.id.to_string()), fields);
    data.preview = Some(wallpaper.thumbnail.unwrap_or(wallpaper.image));
    Ok(data.with_categories(&tree))
}

/// Re-renders a submitted form with its errors.
pub async fn form_with_errors<R>(
    repo: &R,
    mode: FormMode,
    fields: WallpaperFields,
    errors: FieldErrors,
) -> WallpaperFormData
where
    R: CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    let mut data = WallpaperFormData::new(mode, fields);
    data.errors = errors;
    data.with_categories(&tree)
}

/// Checks that the chosen child belongs to the chosen parent.
fn check_category_pair(tree: &CategoryTree, fields: &WallpaperFields) -> Result<(), FieldErrors> {
    let selects = tree.selects(&fields.parent_category, &fields.child_category);
    if !fields.child_category.is_empty() && selects.selection.child.is_none() {
        let mut errors = FieldErrors::new();
        errors.add("child_category", "Subcategory does not belong to the chosen category");
        return Err(errors);
    }
    Ok(())
}

/// Uploads every selected image with the shared settings, one request at a
/// time. Per-file failures are reported in the returned entries.
pub async fn upload_wallpapers<R>(
    repo: &R,
    form: &UploadWallpapersForm,
) -> ServiceResult<UploadReport>
where
    R: WallpaperWriter + CategoryReader + ?Sized,
{
    let payload = form.payload()?;
    let tree = load_tree(repo).await;
    check_category_pair(&tree, &form.fields())?;

    let mut queue = UploadQueue::new();
    for (file, title) in payload.files {
        queue.push(file, title.as_deref());
    }

    let summary = queue.upload_all(repo, &payload.settings).await;

    Ok(UploadReport {
        entries: queue.entries().to_vec(),
        summary,
    })
}

pub async fn get_wallpaper<R>(repo: &R, id: &str) -> ServiceResult<Wallpaper>
where
    R: WallpaperReader + ?Sized,
{
    let id = WallpaperId::new(id)?;
    repo.get_wallpaper(&id).await?.ok_or(ServiceError::NotFound)
}

pub async fn update_wallpaper<R>(
    repo: &R,
    id: &str,
    form: &EditWallpaperForm,
) -> ServiceResult<Wallpaper>
where
    R: WallpaperWriter + CategoryReader + ?Sized,
{
    let id = WallpaperId::new(id)?;
    let updates = form.payload()?;
    let tree = load_tree(repo).await;
    check_category_pair(&tree, &form.fields())?;

    let wallpaper = repo.update_wallpaper(&id, &updates).await.map_err(|err| {
        error!("Failed to update wallpaper {id}: {err}");
        err
    })?;
    Ok(wallpaper)
}

pub async fn delete_wallpaper<R>(repo: &R, id: &str) -> ServiceResult<()>
where
    R: WallpaperWriter + ?Sized,
{
    let id = WallpaperId::new(id)?;
    repo.delete_wallpaper(&id).await.map_err(|err| {
        error!("Failed to delete wallpaper {id}: {err}");
        err
    })?;
    Ok(())
}

/// The backend has no bulk endpoint for wallpapers; ids are deleted one by
/// one and failures collected.
pub async fn bulk_delete_wallpapers<R>(repo: &R, ids: &[&str]) -> BulkDeleteReport
where
    R: WallpaperWriter + ?Sized,
{
    let mut report = BulkDeleteReport::default();
    for raw in ids {
        let result = match WallpaperId::new(*raw) {
            Ok(id) => repo.delete_wallpaper(&id).await.map_err(ServiceError::from),
            Err(e) => Err(ServiceError::from(e)),
        };
        match result {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                error!("Failed to delete wallpaper {raw}: {err}");
                report.failed.push((raw.to_string(), err.user_message()));
            }
        }
    }
    report
}

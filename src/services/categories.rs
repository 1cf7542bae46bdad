//! Services behind the category screens.

use std::collections::HashMap;

use log::error;

use crate::components::category_picker::CategoryTree;
use crate::components::list_controller::ListState;
use crate::domain::category::{Category, CategoryPayload};
use crate::domain::types::CategoryId;
use crate::dto::categories::{CategoriesPageData, CategoryFormData, CategoryRow};
use crate::dto::{FormMode, ListPageData};
use crate::forms::FieldErrors;
use crate::forms::categories::CategoryForm;
use crate::repository::{CategoryListQuery, CategoryReader, CategoryWriter};
use crate::services::lists::{SessionLists, load_list};
use crate::services::{ServiceError, ServiceResult};

pub const CATEGORIES_PATH: &str = "/categories";
/// Column filters of the category list.
pub const CATEGORY_FILTERS: [&str; 2] = ["parent", "active"];

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

pub async fn list_categories<R>(
    repo: &R,
    lists: &SessionLists,
    raw_query: &str,
) -> CategoriesPageData
where
    R: CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    let state = ListState::from_url_query(raw_query, &CATEGORY_FILTERS, lists.page_size());

    let loaded = load_list(&lists.categories, state, |params| {
        let mut query = CategoryListQuery::default().paginate(params.page, params.limit);
        if let Some(search) = params.search.as_deref() {
            query = query.search(search);
        }
        if let Some(parent) = params.filter("parent") {
            query = query.parent(parent);
        }
        match params.filter("active") {
            Some("true") => query = query.is_active(true),
            Some("false") => query = query.is_active(false),
            _ => {}
        }
        repo.list_categories(query)
    })
    .await;

    let names: HashMap<String, String> = tree
        .options()
        .into_iter()
        .map(|option| (option.id, option.name))
        .collect();

    CategoriesPageData {
        list: ListPageData::new(
            CATEGORIES_PATH,
            &loaded.state,
            loaded.view,
            loaded.error.map(|e| e.to_string()),
            |category| CategoryRow::new(category, &names),
        ),
        parents: tree.parent_options(),
    }
}

pub async fn get_category<R>(repo: &R, id: &str) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    let id = CategoryId::new(id)?;
    repo.get_category(&id).await?.ok_or(ServiceError::NotFound)
}

/// Builds the form screen; `current` excludes itself from the parent options.
pub async fn form_data<R>(
    repo: &R,
    mode: FormMode,
    form: CategoryForm,
    errors: FieldErrors,
) -> CategoryFormData
where
    R: CategoryReader + ?Sized,
{
    let tree = load_tree(repo).await;
    let current = match &mode {
        FormMode::Edit(id) => Some(id.clone()),
        FormMode::Create => None,
    };
    let parents = tree
        .parent_options()
        .into_iter()
        .filter(|option| Some(&option.id) != current.as_ref())
        .collect();

    CategoryFormData {
        mode,
        form,
        parents,
        errors,
    }
}

pub async fn load_new_form<R>(repo: &R) -> CategoryFormData
where
    R: CategoryReader + ?Sized,
{
    form_data(repo, FormMode::Create, CategoryForm::initial(), FieldErrors::new()).await
}

pub async fn load_edit_form<R>(repo: &R, id: &str) -> ServiceResult<CategoryFormData>
where
    R: CategoryReader + ?Sized,
{
    let category = get_category(repo, id).await?;
    Ok(form_data(
        repo,
        FormMode::Edit(category.id.to_string()),
        CategoryForm::from_category(&category),
        FieldErrors::new(),
    )
    .await)
}

pub async fn create_category<R>(repo: &R, form: CategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let payload = CategoryPayload::try_from(form)?;
    let category = repo.create_category(&payload).await.map_err(|err| {
        error!("Failed to create category: {err}");
        err
    })?;
    Ok(category)
}

pub async fn update_category<R>(repo: &R, id: &str, form: CategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let id = CategoryId::new(id)?;
    let payload = CategoryPayload::try_from(form)?;
    if payload.parent.as_ref() == Some(&id) {
        let mut errors = FieldErrors::new();
        errors.add("parent", "A category cannot be its own parent");
        return Err(ServiceError::Invalid(errors));
    }

    let category = repo.update_category(&id, &payload).await.map_err(|err| {
        error!("Failed to update category {id}: {err}");
        err
    })?;
    Ok(category)
}

pub async fn delete_category<R>(repo: &R, id: &str) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    let id = CategoryId::new(id)?;
    repo.delete_category(&id).await.map_err(|err| {
        error!("Failed to delete category {id}: {err}");
        err
    })?;
    Ok(())
}

/// Deletes the selected categories with one backend call.
pub async fn bulk_delete_categories<R>(repo: &R, ids: &[&str]) -> ServiceResult<usize>
where
    R: CategoryWriter + ?Sized,
{
    let ids = ids
        .iter()
        .map(|id| CategoryId::new(*id))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Ok(0);
    }

    repo.bulk_delete_categories(&ids).await.map_err(|err| {
        error!("Failed to delete {} categories: {err}", ids.len());
        err
    })?;
    Ok(ids.len())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::services::lists::ListRegistry;
    use crate::domain::page::Page;
    use crate::domain::wallpaper::CategoryRef;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::new(id).expect("valid id"),
            name: id.to_string(),
            slug: id.to_string(),
            parent: parent.map(|p| CategoryRef::Id(CategoryId::new(p).expect("valid id"))),
            is_active: true,
            order: 0,
        }
    }

    fn form(name: &str, parent: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_string(),
            parent: parent.to_string(),
            ..CategoryForm::initial()
        }
    }

    #[tokio::test]
    async fn create_sends_derived_slug() {
        let mut repo = MockRepository::new();
        repo.expect_create_category()
            .withf(|payload| payload.slug.as_str() == "city-lights" && payload.parent.is_none())
            .times(1)
            .returning(|_| Ok(category("c1", None)));

        let created = create_category(&repo, form("City Lights", ""))
            .await
            .expect("should create category");

        assert_eq!(created.id.as_str(), "c1");
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let mut repo = MockRepository::new();
        repo.expect_create_category().times(0);

        let result = create_category(&repo, form("", "")).await;

        assert!(matches!(result, Err(ServiceError::Invalid(_))));
    }

    #[tokio::test]
    async fn category_cannot_be_its_own_parent() {
        let mut repo = MockRepository::new();
        repo.expect_update_category().times(0);

        let result = update_category(&repo, "c1", form("Loop", "c1")).await;

        match result {
            Err(ServiceError::Invalid(errors)) => assert!(errors.get("parent").is_some()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_rejection_is_surfaced() {
        let mut repo = MockRepository::new();
        repo.expect_delete_category()
            .times(1)
            .returning(|_| Err(RepositoryError::Rejected("Category has wallpapers".to_string())));

        let err = delete_category(&repo, "c1").await.unwrap_err();

        assert_eq!(err.user_message(), "Category has wallpapers");
    }

    #[tokio::test]
    async fn bulk_delete_uses_single_call() {
        let mut repo = MockRepository::new();
        repo.expect_bulk_delete_categories()
            .withf(|ids| ids.len() == 2 && ids[0].as_str() == "a" && ids[1].as_str() == "b")
            .times(1)
            .returning(|_| Ok(()));

        let deleted = bulk_delete_categories(&repo, &["a", "b"])
            .await
            .expect("should delete");

        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn edit_form_excludes_itself_from_parents() {
        let mut repo = MockRepository::new();
        repo.expect_get_category()
            .returning(|_| Ok(Some(category("nature", None))));
        repo.expect_list_categories().returning(|_| {
            Ok(Page::single(vec![
                category("nature", None),
                category("cars", None),
                category("forest", Some("nature")),
            ]))
        });

        let data = load_edit_form(&repo, "nature").await.expect("should load form");

        let parents: Vec<_> = data.parents.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(parents, vec!["cars"]);
        assert_eq!(data.form.name, "nature");
    }

    #[tokio::test]
    async fn list_maps_active_filter() {
        let mut repo = MockRepository::new();
        repo.expect_list_categories()
            .withf(|query| query.limit == Some(1000))
            .returning(|_| Ok(Page::single(vec![category("nature", None)])));
        repo.expect_list_categories()
            .withf(|query| {
                query.page == Some(1) && query.limit == Some(10) && query.is_active == Some(false)
            })
            .times(1)
            .returning(|_| Ok(Page::single(vec![])));
        let lists = ListRegistry::new(10).session("s1");

        let data = list_categories(&repo, &lists, "active=false").await;

        assert_eq!(data.list.page_count, 1);
        assert!(data.list.rows.is_empty());
    }
}

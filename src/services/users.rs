//! Services behind the application user screens.

use log::error;

use crate::components::list_controller::ListState;
use crate::domain::types::UserId;
use crate::domain::user::{AppUser, NewAppUser, UpdateAppUser};
use crate::dto::users::{UserFormData, UserRow, UsersPageData};
use crate::dto::{FormMode, ListPageData};
use crate::forms::users::{AppUserFields, AppUserForm};
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::lists::{SessionLists, load_list};
use crate::services::{ServiceError, ServiceResult};

pub const USERS_PATH: &str = "/users";

pub async fn list_users<R>(repo: &R, lists: &SessionLists, raw_query: &str) -> UsersPageData
where
    R: UserReader + ?Sized,
{
    let state = ListState::from_url_query(raw_query, &[], lists.page_size());

    let loaded = load_list(&lists.users, state, |params| {
        let mut query = UserListQuery::new(params.page, params.limit);
        if let Some(search) = params.search.as_deref() {
            query = query.search(search);
        }
        repo.list_users(query)
    })
    .await;

    UsersPageData {
        list: ListPageData::new(
            USERS_PATH,
            &loaded.state,
            loaded.view,
            loaded.error.map(|e| e.to_string()),
            UserRow::from,
        ),
    }
}

pub async fn get_user<R>(repo: &R, id: &str) -> ServiceResult<AppUser>
where
    R: UserReader + ?Sized,
{
    let id = UserId::new(id)?;
    repo.get_user(&id).await?.ok_or(ServiceError::NotFound)
}

pub fn new_form() -> UserFormData {
    UserFormData::new(FormMode::Create, AppUserFields::initial())
}

pub async fn load_edit_form<R>(repo: &R, id: &str) -> ServiceResult<UserFormData>
where
    R: UserReader + ?Sized,
{
    let user = get_user(repo, id).await?;
    let mut data = UserFormData::new(
        FormMode::Edit(user.id.to_string()),
        AppUserFields::from_user(&user),
    );
    data.profile_picture = user.profile_picture;
    Ok(data)
}

pub async fn create_user<R>(repo: &R, form: &AppUserForm) -> ServiceResult<AppUser>
where
    R: UserWriter + ?Sized,
{
    let user = NewAppUser::try_from(form)?;
    let created = repo.create_user(&user).await.map_err(|err| {
        error!("Failed to create user {}: {err}", user.email);
        err
    })?;
    Ok(created)
}

pub async fn update_user<R>(repo: &R, id: &str, form: &AppUserForm) -> ServiceResult<AppUser>
where
    R: UserWriter + ?Sized,
{
    let id = UserId::new(id)?;
    let updates = UpdateAppUser::try_from(form)?;
    let updated = repo.update_user(&id, &updates).await.map_err(|err| {
        error!("Failed to update user {id}: {err}");
        err
    })?;
    Ok(updated)
}

pub async fn delete_user<R>(repo: &R, id: &str) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    let id = UserId::new(id)?;
    repo.delete_user(&id).await.map_err(|err| {
        error!("Failed to delete user {id}: {err}");
        err
    })?;
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::services::lists::ListRegistry;
    use crate::domain::page::Page;
    use crate::domain::user::UserRole;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn user(id: &str) -> AppUser {
        AppUser {
            id: UserId::new(id).expect("valid id"),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Editor,
            is_active: true,
            profile_picture: Some("https://cdn.example.com/jane.png".to_string()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn list_forwards_search_and_page() {
        let mut repo = MockRepository::new();
        repo.expect_list_users()
            .withf(|query| *query == UserListQuery::new(3, 50).search("jane"))
            .times(1)
            .returning(|_| {
                Ok(Page {
                    items: vec![user("u1")],
                    total: 101,
                    total_pages: 3,
                })
            });
        let lists = ListRegistry::new(10).session("s1");

        let data = list_users(&repo, &lists, "page=3&limit=50&search=jane").await;

        assert_eq!(data.list.total, 101);
        assert_eq!(data.list.page_count, 3);
        assert_eq!(data.list.rows[0].role, "editor");
        assert!(data.list.error.is_none());
    }

    #[tokio::test]
    async fn failed_list_reports_error() {
        let mut repo = MockRepository::new();
        repo.expect_list_users()
            .returning(|_| Err(RepositoryError::Transport("timeout".to_string())));
        let lists = ListRegistry::new(10).session("s1");

        let data = list_users(&repo, &lists, "").await;

        assert!(data.list.error.is_some());
        assert_eq!(data.list.page_count, -1);
    }

    #[tokio::test]
    async fn edit_form_prefills_without_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_user()
            .withf(|id| id.as_str() == "u1")
            .returning(|_| Ok(Some(user("u1"))));

        let data = load_edit_form(&repo, "u1").await.expect("should load user");

        assert_eq!(data.fields.email, "jane@example.com");
        assert!(data.fields.password.is_empty());
        assert!(data.profile_picture.is_some());
        assert!(data.mode.is_edit());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_user().returning(|_| Ok(None));

        let result = get_user(&repo, "nope").await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn delete_failure_is_propagated() {
        let mut repo = MockRepository::new();
        repo.expect_delete_user().times(1).returning(|_| {
            Err(RepositoryError::Request {
                status: 500,
                message: "boom".to_string(),
            })
        });

        let err = delete_user(&repo, "u1").await.unwrap_err();

        assert_eq!(err.user_message(), "boom");
    }
}

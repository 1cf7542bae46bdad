use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::dto::users::UserFormData;
use crate::dto::{ConfirmData, FormMode};
use crate::forms::ConfirmForm;
use crate::forms::users::AppUserForm;
use crate::repository::HttpRepository;
use crate::routes::{
    alerts, base_context, confirm_url, fail_and_redirect, list_session, list_url, redirect,
    render_template, with_session_cookie,
};
use crate::services::ServiceError;
use crate::services::lists::ListRegistry;
use crate::services::users::{
    self, USERS_PATH, create_user, delete_user, get_user, load_edit_form, new_form, update_user,
};

fn render_form(tera: &Tera, context: &mut Context, form: &UserFormData) -> HttpResponse {
    context.insert("form", form);
    render_template(tera, "users/form.html", context)
}

#[derive(Deserialize)]
struct BackQuery {
    back: Option<String>,
}

#[get("/users")]
pub async fn show_users(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    lists: web::Data<ListRegistry>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let (session_id, cookie) = list_session(&req);
    let session = lists.session(&session_id);
    let data = users::list_users(repo.get_ref(), &session, req.query_string()).await;

    let mut alerts = alerts(&flash_messages);
    if let Some(err) = &data.list.error {
        alerts.push((format!("Failed to load users: {err}"), "danger"));
    }
    let mut context = base_context(&alerts, "users");
    context.insert("data", &data);
    context.insert("search_debounce_ms", &lists.search_delay_ms());

    with_session_cookie(render_template(&tera, "users/index.html", &context), cookie)
}

#[get("/users/new")]
pub async fn new_user(
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let mut context = base_context(&alerts(&flash_messages), "users");
    render_form(&tera, &mut context, &new_form())
}

#[post("/users/new")]
pub async fn add_user(
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<AppUserForm>,
) -> impl Responder {
    match create_user(repo.get_ref(), &form).await {
        Ok(user) => {
            FlashMessage::success(format!("User {} created.", user.email)).send();
            redirect(USERS_PATH)
        }
        Err(ServiceError::Invalid(errors)) => {
            let mut data = UserFormData::new(FormMode::Create, form.fields());
            data.errors = errors;
            let mut context = base_context(&[], "users");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect("create user", &err, "/users/new"),
    }
}

#[get("/users/{id}/edit")]
pub async fn edit_user(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    match load_edit_form(repo.get_ref(), &id).await {
        Ok(form) => {
            let mut context = base_context(&alerts(&flash_messages), "users");
            render_form(&tera, &mut context, &form)
        }
        Err(err) => fail_and_redirect("load user", &err, USERS_PATH),
    }
}

#[post("/users/{id}/edit")]
pub async fn save_user(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<AppUserForm>,
) -> impl Responder {
    match update_user(repo.get_ref(), &id, &form).await {
        Ok(user) => {
            FlashMessage::success(format!("User {} saved.", user.email)).send();
            redirect(USERS_PATH)
        }
        Err(ServiceError::Invalid(errors)) => {
            let mut data = UserFormData::new(FormMode::Edit(id.to_string()), form.fields());
            data.errors = errors;
            if let Ok(current) = get_user(repo.get_ref(), &id).await {
                data.profile_picture = current.profile_picture;
            }
            let mut context = base_context(&[], "users");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect("save user", &err, &format!("{USERS_PATH}/{id}/edit")),
    }
}

#[get("/users/{id}/delete")]
pub async fn confirm_delete_user(
    id: web::Path<String>,
    query: web::Query<BackQuery>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = match get_user(repo.get_ref(), &id).await {
        Ok(user) => user,
        Err(err) => return fail_and_redirect("load user", &err, USERS_PATH),
    };

    let confirm = ConfirmData {
        title: "Delete user".to_string(),
        message: format!("Delete {} ({})? This cannot be undone.", user.name, user.email),
        action: format!("{USERS_PATH}/{id}/delete"),
        ids: vec![],
        back: list_url(USERS_PATH, query.back.as_deref()),
    };
    let mut context = base_context(&[], "users");
    context.insert("confirm", &confirm);
    context.insert("back_query", &query.back);
    render_template(&tera, "confirm.html", &context)
}

#[post("/users/{id}/delete")]
pub async fn destroy_user(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    web::Form(form): web::Form<ConfirmForm>,
) -> impl Responder {
    let back = list_url(USERS_PATH, form.back.as_deref());
    if !form.confirmed() {
        let confirm = format!("{USERS_PATH}/{id}/delete");
        return redirect(&confirm_url(&confirm, form.back.as_deref()));
    }

    match delete_user(repo.get_ref(), &id).await {
        Ok(()) => {
            FlashMessage::success("User deleted.".to_string()).send();
            redirect(&back)
        }
        Err(err) => fail_and_redirect("delete user", &err, &back),
    }
}

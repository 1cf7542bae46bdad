use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::dto::categories::CategoryFormData;
use crate::dto::{ConfirmData, FormMode};
use crate::forms::categories::CategoryForm;
use crate::forms::{BulkDeleteForm, ConfirmForm};
use crate::repository::HttpRepository;
use crate::routes::{
    alerts, base_context, confirm_url, fail_and_redirect, list_session, list_url, redirect,
    render_template, with_session_cookie,
};
use crate::services::ServiceError;
use crate::services::categories::{
    self, CATEGORIES_PATH, bulk_delete_categories, create_category, delete_category,
    get_category, load_edit_form, load_new_form, update_category,
};
use crate::services::lists::ListRegistry;

fn render_form(tera: &Tera, context: &mut Context, form: &CategoryFormData) -> HttpResponse {
    context.insert("form", form);
    render_template(tera, "categories/form.html", context)
}

#[derive(Deserialize)]
struct BackQuery {
    back: Option<String>,
}

#[get("/categories")]
pub async fn show_categories(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    lists: web::Data<ListRegistry>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let (session_id, cookie) = list_session(&req);
    let session = lists.session(&session_id);
    let data = categories::list_categories(repo.get_ref(), &session, req.query_string()).await;

    let mut alerts = alerts(&flash_messages);
    if let Some(err) = &data.list.error {
        alerts.push((format!("Failed to load categories: {err}"), "danger"));
    }
    let mut context = base_context(&alerts, "categories");
    context.insert("data", &data);
    context.insert("search_debounce_ms", &lists.search_delay_ms());

    with_session_cookie(render_template(&tera, "categories/index.html", &context), cookie)
}

#[get("/categories/new")]
pub async fn new_category(
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let form = load_new_form(repo.get_ref()).await;
    let mut context = base_context(&alerts(&flash_messages), "categories");
    render_form(&tera, &mut context, &form)
}

#[post("/categories/new")]
pub async fn add_category(
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    match create_category(repo.get_ref(), form.clone()).await {
        Ok(category) => {
            FlashMessage::success(format!("Category \"{}\" created.", category.name)).send();
            redirect(CATEGORIES_PATH)
        }
        Err(ServiceError::Invalid(errors)) => {
            let data = categories::form_data(repo.get_ref(), FormMode::Create, form, errors).await;
            let mut context = base_context(&[], "categories");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect("create category", &err, "/categories/new"),
    }
}

#[get("/categories/{id}/edit")]
pub async fn edit_category(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    match load_edit_form(repo.get_ref(), &id).await {
        Ok(form) => {
            let mut context = base_context(&alerts(&flash_messages), "categories");
            render_form(&tera, &mut context, &form)
        }
        Err(err) => fail_and_redirect("load category", &err, CATEGORIES_PATH),
    }
}

#[post("/categories/{id}/edit")]
pub async fn save_category(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    match update_category(repo.get_ref(), &id, form.clone()).await {
        Ok(category) => {
            FlashMessage::success(format!("Category \"{}\" saved.", category.name)).send();
            redirect(CATEGORIES_PATH)
        }
        Err(ServiceError::Invalid(errors)) => {
            let data = categories::form_data(
                repo.get_ref(),
                FormMode::Edit(id.to_string()),
                form,
                errors,
            )
            .await;
            let mut context = base_context(&[], "categories");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect(
            "save category",
            &err,
            &format!("{CATEGORIES_PATH}/{id}/edit"),
        ),
    }
}

#[get("/categories/{id}/delete")]
pub async fn confirm_delete_category(
    id: web::Path<String>,
    query: web::Query<BackQuery>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let category = match get_category(repo.get_ref(), &id).await {
        Ok(category) => category,
        Err(err) => return fail_and_redirect("load category", &err, CATEGORIES_PATH),
    };

    let confirm = ConfirmData {
        title: "Delete category".to_string(),
        message: format!("Delete \"{}\"? This cannot be undone.", category.name),
        action: format!("{CATEGORIES_PATH}/{id}/delete"),
        ids: vec![],
        back: list_url(CATEGORIES_PATH, query.back.as_deref()),
    };
    let mut context = base_context(&[], "categories");
    context.insert("confirm", &confirm);
    context.insert("back_query", &query.back);
    render_template(&tera, "confirm.html", &context)
}

#[post("/categories/{id}/delete")]
pub async fn destroy_category(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    web::Form(form): web::Form<ConfirmForm>,
) -> impl Responder {
    let back = list_url(CATEGORIES_PATH, form.back.as_deref());
    if !form.confirmed() {
        let confirm = format!("{CATEGORIES_PATH}/{id}/delete");
        return redirect(&confirm_url(&confirm, form.back.as_deref()));
    }

    match delete_category(repo.get_ref(), &id).await {
        Ok(()) => {
            FlashMessage::success("Category deleted.".to_string()).send();
            redirect(&back)
        }
        Err(err) => fail_and_redirect("delete category", &err, &back),
    }
}

#[post("/categories/bulk-delete")]
pub async fn bulk_delete(
    body: String,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form = match BulkDeleteForm::parse(&body) {
        Ok(form) => form,
        Err(err) => {
            let err = ServiceError::from(err);
            return fail_and_redirect("read selection", &err, CATEGORIES_PATH);
        }
    };
    let back = list_url(CATEGORIES_PATH, form.back.as_deref());
    let ids = form.selected_ids();

    if ids.is_empty() {
        FlashMessage::warning("No categories selected.".to_string()).send();
        return redirect(&back);
    }

    if !form.confirmed() {
        let confirm = ConfirmData {
            title: "Delete categories".to_string(),
            message: format!("Delete {} selected categories? This cannot be undone.", ids.len()),
            action: format!("{CATEGORIES_PATH}/bulk-delete"),
            ids: ids.iter().map(|id| id.to_string()).collect(),
            back: back.clone(),
        };
        let mut context = base_context(&[], "categories");
        context.insert("confirm", &confirm);
        context.insert("back_query", &form.back);
        return render_template(&tera, "confirm.html", &context);
    }

    match bulk_delete_categories(repo.get_ref(), &ids).await {
        Ok(deleted) => {
            FlashMessage::success(format!("Deleted {deleted} categories.")).send();
            redirect(&back)
        }
        Err(err) => fail_and_redirect("delete categories", &err, &back),
    }
}

use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::dto::wallpapers::WallpaperFormData;
use crate::dto::{ConfirmData, FormMode};
use crate::forms::wallpapers::{EditWallpaperForm, UploadWallpapersForm};
use crate::forms::{BulkDeleteForm, ConfirmForm};
use crate::repository::HttpRepository;
use crate::routes::{
    alerts, base_context, confirm_url, fail_and_redirect, list_session, list_url, redirect,
    render_template, with_session_cookie,
};
use crate::services::ServiceError;
use crate::services::lists::ListRegistry;
use crate::services::wallpapers::{
    self, WALLPAPERS_PATH, bulk_delete_wallpapers, delete_wallpaper, get_wallpaper,
    load_edit_form, load_new_form, update_wallpaper, upload_wallpapers,
};

fn render_form(tera: &Tera, context: &mut Context, form: &WallpaperFormData) -> HttpResponse {
    context.insert("form", form);
    render_template(tera, "wallpapers/form.html", context)
}

#[get("/wallpapers")]
pub async fn show_wallpapers(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    lists: web::Data<ListRegistry>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let (session_id, cookie) = list_session(&req);
    let session = lists.session(&session_id);
    let data = wallpapers::list_wallpapers(repo.get_ref(), &session, req.query_string()).await;

    let mut alerts = alerts(&flash_messages);
    if let Some(err) = &data.list.error {
        alerts.push((format!("Failed to load wallpapers: {err}"), "danger"));
    }
    let mut context = base_context(&alerts, "wallpapers");
    context.insert("data", &data);
    context.insert("search_debounce_ms", &lists.search_delay_ms());

    with_session_cookie(render_template(&tera, "wallpapers/index.html", &context), cookie)
}

#[get("/wallpapers/new")]
pub async fn new_wallpapers(
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let form = load_new_form(repo.get_ref()).await;
    let mut context = base_context(&alerts(&flash_messages), "wallpapers");
    render_form(&tera, &mut context, &form)
}

#[post("/wallpapers/new")]
pub async fn create_wallpapers(
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<UploadWallpapersForm>,
) -> impl Responder {
    match upload_wallpapers(repo.get_ref(), &form).await {
        Ok(report) if report.summary.failed == 0 => {
            FlashMessage::success(format!("Uploaded {} wallpaper(s).", report.summary.done)).send();
            redirect(WALLPAPERS_PATH)
        }
        Ok(report) => {
            let level = if report.summary.done > 0 { "warning" } else { "danger" };
            let message = format!(
                "{} uploaded, {} failed.",
                report.summary.done, report.summary.failed
            );
            let mut context = base_context(&[(message, level)], "wallpapers");
            context.insert("report", &report);
            render_template(&tera, "wallpapers/upload_report.html", &context)
        }
        Err(ServiceError::Invalid(errors)) => {
            let data = wallpapers::form_with_errors(
                repo.get_ref(),
                FormMode::Create,
                form.fields(),
                errors,
            )
            .await;
            let mut context = base_context(&[], "wallpapers");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect("upload wallpapers", &err, "/wallpapers/new"),
    }
}

#[get("/wallpapers/{id}/edit")]
pub async fn edit_wallpaper(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    match load_edit_form(repo.get_ref(), &id).await {
        Ok(form) => {
            let mut context = base_context(&alerts(&flash_messages), "wallpapers");
            render_form(&tera, &mut context, &form)
        }
        Err(err) => fail_and_redirect("load wallpaper", &err, WALLPAPERS_PATH),
    }
}

#[post("/wallpapers/{id}/edit")]
pub async fn save_wallpaper(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<EditWallpaperForm>,
) -> impl Responder {
    match update_wallpaper(repo.get_ref(), &id, &form).await {
        Ok(wallpaper) => {
            FlashMessage::success(format!("Wallpaper \"{}\" saved.", wallpaper.title)).send();
            redirect(WALLPAPERS_PATH)
        }
        Err(ServiceError::Invalid(errors)) => {
            let mut data = wallpapers::form_with_errors(
                repo.get_ref(),
                FormMode::Edit(id.to_string()),
                form.fields(),
                errors,
            )
            .await;
            if let Ok(current) = get_wallpaper(repo.get_ref(), &id).await {
                data.preview = Some(current.thumbnail.unwrap_or(current.image));
            }
            let mut context = base_context(&[], "wallpapers");
            render_form(&tera, &mut context, &data)
        }
        Err(err) => fail_and_redirect(
            "save wallpaper",
            &err,
            &format!("{WALLPAPERS_PATH}/{id}/edit"),
        ),
    }
}

#[derive(serde::Deserialize)]
struct BackQuery {
    back: Option<String>,
}

#[get("/wallpapers/{id}/delete")]
pub async fn confirm_delete_wallpaper(
    id: web::Path<String>,
    query: web::Query<BackQuery>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let wallpaper = match get_wallpaper(repo.get_ref(), &id).await {
        Ok(wallpaper) => wallpaper,
        Err(err) => return fail_and_redirect("load wallpaper", &err, WALLPAPERS_PATH),
    };

    let confirm = ConfirmData {
        title: "Delete wallpaper".to_string(),
        message: format!("Delete \"{}\"? This cannot be undone.", wallpaper.title),
        action: format!("{WALLPAPERS_PATH}/{id}/delete"),
        ids: vec![],
        back: list_url(WALLPAPERS_PATH, query.back.as_deref()),
    };
    let mut context = base_context(&[], "wallpapers");
    context.insert("confirm", &confirm);
    context.insert("back_query", &query.back);
    render_template(&tera, "confirm.html", &context)
}

#[post("/wallpapers/{id}/delete")]
pub async fn destroy_wallpaper(
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    web::Form(form): web::Form<ConfirmForm>,
) -> impl Responder {
    let back = list_url(WALLPAPERS_PATH, form.back.as_deref());
    if !form.confirmed() {
        let confirm = format!("{WALLPAPERS_PATH}/{id}/delete");
        return redirect(&confirm_url(&confirm, form.back.as_deref()));
    }

    match delete_wallpaper(repo.get_ref(), &id).await {
        Ok(()) => {
            FlashMessage::success("Wallpaper deleted.".to_string()).send();
            redirect(&back)
        }
        Err(err) => fail_and_redirect("delete wallpaper", &err, &back),
    }
}

/// First submit (without `confirm`) renders the confirmation page, the second
/// one deletes.
#[post("/wallpapers/bulk-delete")]
pub async fn bulk_delete(
    body: String,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form = match BulkDeleteForm::parse(&body) {
        Ok(form) => form,
        Err(err) => {
            let err = ServiceError::from(err);
            return fail_and_redirect("read selection", &err, WALLPAPERS_PATH);
        }
    };
    let back = list_url(WALLPAPERS_PATH, form.back.as_deref());
    let ids = form.selected_ids();

    if ids.is_empty() {
        FlashMessage::warning("No wallpapers selected.".to_string()).send();
        return redirect(&back);
    }

    if !form.confirmed() {
        let confirm = ConfirmData {
            title: "Delete wallpapers".to_string(),
            message: format!("Delete {} selected wallpaper(s)? This cannot be undone.", ids.len()),
            action: format!("{WALLPAPERS_PATH}/bulk-delete"),
            ids: ids.iter().map(|id| id.to_string()).collect(),
            back: back.clone(),
        };
        let mut context = base_context(&[], "wallpapers");
        context.insert("confirm", &confirm);
        context.insert("back_query", &form.back);
        return render_template(&tera, "confirm.html", &context);
    }

    let report = bulk_delete_wallpapers(repo.get_ref(), &ids).await;
    if report.failed.is_empty() {
        FlashMessage::success(format!("Deleted {} wallpaper(s).", report.deleted)).send();
    } else {
        let details = report
            .failed
            .iter()
            .map(|(id, message)| format!("{id}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        FlashMessage::error(format!(
            "Deleted {}, failed {} ({details}).",
            report.deleted,
            report.failed.len()
        ))
        .send();
    }
    redirect(&back)
}

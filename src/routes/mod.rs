//! HTTP handlers of the admin console.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use log::error;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::services::ServiceError;

pub mod api;
pub mod categories;
pub mod main;
pub mod users;
pub mod wallpapers;

/// Maps a flash level to the Bootstrap alert class used by the templates.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Toasts queued by the previous request.
pub fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<(String, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect()
}

/// Context shared by every page.
pub fn base_context(alerts: &[(String, &'static str)], current_page: &str) -> Context {
    let mut context = Context::new();
    context.insert("alerts", alerts);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// `303 See Other`, so that reloading the target never re-submits a form.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// List URL, keeping the list's query string when one was carried along.
pub fn list_url(path: &str, back: Option<&str>) -> String {
    match back.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => format!("{path}?{}", query.trim_start_matches('?')),
        None => path.to_string(),
    }
}

/// Cookie keying the visitor's list state in the `ListRegistry`.
pub const LIST_SESSION_COOKIE: &str = "list_session";

/// Id of the visitor's list session. A missing or malformed cookie starts a
/// new session; the returned cookie then has to be set on the response.
pub fn list_session(req: &HttpRequest) -> (String, Option<Cookie<'static>>) {
    let known = req
        .cookie(LIST_SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    if let Some(id) = known {
        return (id.to_string(), None);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build(LIST_SESSION_COOKIE, id.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    (id, Some(cookie))
}

/// Sets `cookie` on `response` when a new list session was started.
pub fn with_session_cookie(mut response: HttpResponse, cookie: Option<Cookie<'_>>) -> HttpResponse {
    if let Some(cookie) = cookie {
        if let Err(err) = response.add_cookie(&cookie) {
            error!("Failed to set list session cookie: {err}");
        }
    }
    response
}

/// `back` carried as the query of a confirmation page URL.
pub fn confirm_url(action: &str, back: Option<&str>) -> String {
    match back.map(str::trim).filter(|q| !q.is_empty()) {
        Some(back) => match serde_html_form::to_string([("back", back)]) {
            Ok(query) => format!("{action}?{query}"),
            Err(err) => {
                error!("Failed to encode back query: {err}");
                action.to_string()
            }
        },
        None => action.to_string(),
    }
}

/// Logs a failed mutation, queues it as an error toast and redirects.
pub fn fail_and_redirect(action: &str, err: &ServiceError, location: &str) -> HttpResponse {
    error!("Failed to {action}: {err}");
    FlashMessage::error(format!("Failed to {action}: {}", err.user_message())).send();
    redirect(location)
}

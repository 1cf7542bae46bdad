use actix_web::{HttpResponse, Responder, get, web};
use log::error;
use serde::Deserialize;

use crate::repository::HttpRepository;
use crate::services::ServiceError;
use crate::services::options::category_select;

#[derive(Deserialize)]
struct CategoryOptionsQuery {
    #[serde(default)]
    q: String,
    parent: Option<String>,
    selected: Option<String>,
}

/// Typeahead source of the category pickers.
#[get("/options/categories")]
pub async fn api_category_options(
    params: web::Query<CategoryOptionsQuery>,
    repo: web::Data<HttpRepository>,
) -> impl Responder {
    let result = category_select(
        repo.get_ref(),
        &params.q,
        params.parent.as_deref(),
        params.selected.as_deref(),
    )
    .await;

    match result {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(ServiceError::TypeConstraint(_)) => HttpResponse::BadRequest().finish(),
        Err(e) => {
            error!("Failed to list category options: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

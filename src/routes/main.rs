use actix_web::{Responder, get};

use crate::routes::redirect;
use crate::services::wallpapers::WALLPAPERS_PATH;

#[get("/")]
pub async fn show_index() -> impl Responder {
    redirect(WALLPAPERS_PATH)
}

#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_multipart::form::MultipartFormConfig;
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::HttpRepository;
#[cfg(feature = "server")]
use crate::services::lists::ListRegistry;

pub mod components;
pub mod domain;
pub mod error_conversions;
pub mod repository;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Upper bound of one multipart request; batch uploads carry many images.
#[cfg(feature = "server")]
const UPLOAD_TOTAL_LIMIT: usize = 512 * 1024 * 1024;

/// Registers every console route. Handlers expect `Tera`, `HttpRepository`
/// and `ListRegistry` app data.
#[cfg(feature = "server")]
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    use crate::routes::{api, categories, main, users, wallpapers};

    cfg.service(web::scope("/api").service(api::api_category_options))
        .service(main::show_index)
        .service(wallpapers::show_wallpapers)
        .service(wallpapers::new_wallpapers)
        .service(wallpapers::create_wallpapers)
        .service(wallpapers::bulk_delete)
        .service(wallpapers::edit_wallpaper)
        .service(wallpapers::save_wallpaper)
        .service(wallpapers::confirm_delete_wallpaper)
        .service(wallpapers::destroy_wallpaper)
        .service(categories::show_categories)
        .service(categories::new_category)
        .service(categories::add_category)
        .service(categories::bulk_delete)
        .service(categories::edit_category)
        .service(categories::save_category)
        .service(categories::confirm_delete_category)
        .service(categories::destroy_category)
        .service(users::show_users)
        .service(users::new_user)
        .service(users::add_user)
        .service(users::edit_user)
        .service(users::save_user)
        .service(users::confirm_delete_user)
        .service(users::destroy_user);
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let repo = HttpRepository::new(server_config.api_config())
        .map_err(|e| std::io::Error::other(format!("Failed to build API client: {e}")))?;
    log::info!("Using catalog API at {}", server_config.api_base_url);

    let lists = web::Data::new(
        ListRegistry::new(server_config.default_page_size)
            .with_search_delay(Duration::from_millis(server_config.search_debounce_ms)),
    );

    // Keys and stores for flash messages.
    if server_config.secret.len() < 32 {
        return Err(std::io::Error::other("secret must be at least 32 bytes long"));
    }
    let secret_key = Key::derive_from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting wallpaper admin on http://{}:{}",
        server_config.domain,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .configure(configure_routes)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(lists.clone())
            .app_data(MultipartFormConfig::default().total_limit(UPLOAD_TOTAL_LIMIT))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}

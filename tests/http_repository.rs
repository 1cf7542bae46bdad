use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wallpaper_admin::domain::file::UploadFile;
use wallpaper_admin::domain::types::{CategoryId, Tags, WallpaperId, WallpaperTitle};
use wallpaper_admin::domain::wallpaper::{
    NewWallpaper, WallpaperFormat, WallpaperSettings, WallpaperStatus,
};
use wallpaper_admin::repository::errors::RepositoryError;
use wallpaper_admin::repository::{
    ApiConfig, CategoryListQuery, CategoryReader, CategoryWriter, HttpRepository,
    WallpaperListQuery, WallpaperReader, WallpaperWriter,
};

fn repo(server: &MockServer) -> HttpRepository {
    HttpRepository::new(ApiConfig::new(&format!("{}/api", server.uri()))).unwrap()
}

fn wallpaper_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "image": format!("https://cdn.example.com/{id}.jpg"),
        "thumbnail": format!("https://cdn.example.com/{id}_t.jpg"),
        "category": { "_id": "c1", "name": "Nature" },
        "tags": ["forest"],
        "format": "jpg",
        "status": "active",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn list_wallpapers_sends_query_and_reads_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wallpapers"))
        .and(query_param("page", "3"))
        .and(query_param("limit", "10"))
        .and(query_param("search", "sun"))
        .and(query_param("status", "draft"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [wallpaper_json("w1", "Sunset")],
            "pagination": { "total": 21, "totalPages": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = repo(&server)
        .list_wallpapers(WallpaperListQuery::new(3, 10).search("sun").status("draft"))
        .await
        .unwrap();

    assert_eq!(page.total, 21);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items[0].title, "Sunset");
    assert_eq!(
        page.items[0].category.as_ref().unwrap().id().as_str(),
        "c1"
    );
}

#[tokio::test]
async fn missing_pagination_block_is_a_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "_id": "c1", "name": "Nature", "slug": "nature", "parent": null },
                { "_id": "c2", "name": "Forest", "slug": "forest", "parent": "c1" }
            ]
        })))
        .mount(&server)
        .await;

    let page = repo(&server)
        .list_categories(CategoryListQuery::all())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items[1].parent_id().unwrap().as_str(), "c1");
}

#[tokio::test]
async fn not_found_maps_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wallpapers/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "nope" })))
        .mount(&server)
        .await;

    let found = repo(&server)
        .get_wallpaper(&WallpaperId::new("missing").unwrap())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/categories/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Category has wallpapers"
        })))
        .mount(&server)
        .await;

    let err = repo(&server)
        .delete_category(&CategoryId::new("c1").unwrap())
        .await
        .unwrap_err();

    match err {
        RepositoryError::Rejected(message) => assert_eq!(message, "Category has wallpapers"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wallpapers"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "database down" })))
        .mount(&server)
        .await;

    let err = repo(&server)
        .list_wallpapers(WallpaperListQuery::new(1, 10))
        .await
        .unwrap_err();

    match err {
        RepositoryError::Request { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_wallpaper_posts_multipart_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wallpapers"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("Misty Forest"))
        .and(body_string_contains("name=\"image\"; filename=\"forest.jpg\""))
        .and(body_string_contains("nature,forest"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": wallpaper_json("w9", "Misty Forest")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = HttpRepository::new(
        ApiConfig::new(&format!("{}/api", server.uri()))
            .with_token(Some("secret-token".to_string())),
    )
    .unwrap();
    let wallpaper = NewWallpaper {
        title: WallpaperTitle::new("Misty Forest").unwrap(),
        settings: WallpaperSettings {
            category: CategoryId::new("c1").unwrap(),
            tags: Tags::parse("nature, forest"),
            format: WallpaperFormat::Jpg,
            status: WallpaperStatus::Active,
        },
        image: UploadFile::new("forest.jpg", Some("image/jpeg".to_string()), vec![1, 2, 3]),
    };

    let created = repo.create_wallpaper(&wallpaper).await.unwrap();

    assert_eq!(created.id.as_str(), "w9");
}

#[tokio::test]
async fn bulk_delete_categories_sends_all_ids_at_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/categories/bulk-delete"))
        .and(body_json(json!({ "ids": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    repo(&server)
        .bulk_delete_categories(&[CategoryId::new("a").unwrap(), CategoryId::new("b").unwrap()])
        .await
        .unwrap();
}

#[tokio::test]
async fn bare_record_without_envelope_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wallpapers/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wallpaper_json("w1", "Sunset")))
        .mount(&server)
        .await;

    let wallpaper = repo(&server)
        .get_wallpaper(&WallpaperId::new("w1").unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(wallpaper.title, "Sunset");
}

#[tokio::test]
async fn record_ids_are_escaped_in_the_request_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/wallpapers/w1%3Fhard=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repo(&server);
    repo.delete_wallpaper(&WallpaperId::new("w1?hard=true").unwrap())
        .await
        .unwrap();

    let err = repo
        .delete_wallpaper(&WallpaperId::new("..").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidRequest(_)));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

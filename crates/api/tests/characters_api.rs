//! Reference-image catalog endpoint against a fake storage server.

mod common;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::{body_json, build_test_app, fast_polling, get, pipeline, serve, storage};
use common::{FakeJobs, FakeStore};
use serde_json::{json, Value};

async fn app_with_catalog(listing: Router) -> Router {
    let base = serve(listing).await;
    build_test_app(
        pipeline(FakeJobs::accepting(), FakeStore::ready_after(0), fast_polling(3)),
        storage(&base),
    )
}

fn listing() -> Router {
    Router::new().route(
        "/storage/v1/object/list/{bucket}",
        post(|Path(bucket): Path<String>, Json(body): Json<Value>| async move {
            assert_eq!(bucket, "phonepe_character_images");
            let folder = body["prefix"].as_str().unwrap_or_default().to_string();
            Json(json!([
                { "name": format!("{folder}-1.png") },
                { "name": ".emptyFolderPlaceholder" },
                { "name": format!("{folder}-2.jpg") },
            ]))
        }),
    )
}

#[tokio::test]
async fn lists_reference_images_for_gender() {
    let app = app_with_catalog(listing()).await;

    let response = get(app, "/api/v1/characters/Female").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let images = json["data"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["name"], "female-1.png");
    assert!(images[0]["url"]
        .as_str()
        .unwrap()
        .ends_with("/storage/v1/object/public/phonepe_character_images/female/female-1.png"));
}

#[tokio::test]
async fn unknown_gender_is_rejected() {
    let app = app_with_catalog(listing()).await;

    let response = get(app, "/api/v1/characters/robot").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn storage_failure_is_a_bad_gateway() {
    let failing = Router::new().route(
        "/storage/v1/object/list/{bucket}",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let app = app_with_catalog(failing).await;

    let response = get(app, "/api/v1/characters/male").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "CATALOG_UNAVAILABLE");
}

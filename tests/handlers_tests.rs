//! End-to-end handler tests over the in-memory repository.
//!
//! Requests are driven straight through the router with `tower::ServiceExt`,
//! so these cover routing, status codes, the uniform error body, and the
//! wire shaping in one pass.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bigdecimal::BigDecimal;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use housing_rust::db::repositories::LocalRepository;
use housing_rust::db::repository::{
    FavoriteRepository, FullRepository, ImageRepository, ListingRepository, UniversityRepository,
};
use housing_rust::http::{create_router, AppState};
use housing_rust::models::{NewListing, User};
use housing_rust::storage::{ObjectStore, ObjectStoreError, ObjectStoreResult};

/// Object store stub recording uploads and deletes.
#[derive(Default)]
struct FakeStore {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    fail_delete: bool,
    fail_upload: bool,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(
        &self,
        _data: Bytes,
        original_name: &str,
        _content_type: &str,
        listing_id: i64,
    ) -> ObjectStoreResult<String> {
        if self.fail_upload {
            return Err(ObjectStoreError::Upload("bucket unavailable".to_string()));
        }
        let url = format!("https://bucket.s3.test/listings/{listing_id}/{original_name}");
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> ObjectStoreResult<()> {
        self.deletes.lock().unwrap().push(url.to_string());
        if self.fail_delete {
            return Err(ObjectStoreError::Delete("access denied".to_string()));
        }
        Ok(())
    }
}

struct TestApp {
    repo: Arc<LocalRepository>,
    store: Arc<FakeStore>,
    router: axum::Router,
}

fn test_app(store: FakeStore) -> TestApp {
    let repo = Arc::new(LocalRepository::new());
    let store = Arc::new(store);
    let state = AppState::new(
        repo.clone() as Arc<dyn FullRepository>,
        store.clone() as Arc<dyn ObjectStore>,
    );
    TestApp {
        repo,
        store,
        router: create_router(state),
    }
}

fn seeded_listing(title: &str) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "Near campus".to_string(),
        location: "Davis".to_string(),
        address: Some("123 A St".to_string()),
        city: "Davis".to_string(),
        state: "CA".to_string(),
        zip_code: Some("95616".to_string()),
        latitude: Some(38.54),
        longitude: Some(-121.74),
        monthly_rent: BigDecimal::from(1850),
        bedrooms: "Studio".to_string(),
        bathrooms: "1.5".to_string(),
        square_feet: Some(420),
        room_type: "Studio".to_string(),
        amenities: "WiFi, Pool".to_string(),
        image_url: String::new(),
        available_from: None,
        owner_id: 1,
    }
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = test_app(FakeStore::default());
    let (status, body) = send(&app.router, get("/api/health/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    app.repo.set_healthy(false);
    let (_, body) = send(&app.router, get("/api/health/")).await;
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn listing_shapes_studio_and_amenities() {
    let app = test_app(FakeStore::default());
    app.repo.insert_user(User {
        id: 1,
        username: "ndyponc".to_string(),
        email: "n@example.com".to_string(),
        join_date: chrono::Utc::now(),
        is_active: true,
    });
    let listing = app.repo.create_listing(seeded_listing("Studio")).await.unwrap();

    let (status, body) = send(&app.router, get(&format!("/api/listings/{}/", listing.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bedrooms"], 0);
    assert_eq!(body["bathrooms"], 1.5);
    assert_eq!(body["amenities"], json!(["WiFi", "Pool"]));
    assert_eq!(body["price"], 1850.0);
    assert_eq!(body["type"], "Studio");
    assert_eq!(body["address"], "123 A St, Davis, CA, 95616");
    assert_eq!(body["owner"]["name"], "N. Dyponc");
    assert_eq!(body["owner"]["verified"], true);
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn unknown_listing_is_404_with_uniform_body() {
    let app = test_app(FakeStore::default());
    let (status, body) = send(&app.router, get("/api/listings/999/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn create_listing_returns_full_shape() {
    let app = test_app(FakeStore::default());
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/listings/",
            json!({
                "title": "1BR Near Campus",
                "description": "Quiet",
                "city": "Davis",
                "state": "CA",
                "price": 1200.0,
                "bedrooms": "1",
                "bathrooms": "1",
                "type": "apartment",
                "lat": 38.5,
                "lng": -121.7,
                "amenities": ["WiFi"],
                "owner_id": 42
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "1BR Near Campus");
    assert_eq!(body["amenities"], json!(["WiFi"]));
    // Unknown owner shapes as the generic verified owner.
    assert_eq!(body["owner"]["name"], "Property Owner");
    assert_eq!(body["available"], true);
    assert_eq!(body["images"], json!([]));
}

#[tokio::test]
async fn create_listing_missing_field_is_400() {
    let app = test_app(FakeStore::default());
    let (status, body) = send(
        &app.router,
        post_json("/api/listings/", json!({"title": "incomplete"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn malformed_json_body_is_400_with_uniform_body() {
    let app = test_app(FakeStore::default());
    let request = Request::post("/api/listings/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn non_integer_path_id_is_400_with_uniform_body() {
    let app = test_app(FakeStore::default());
    let (status, body) = send(&app.router, get("/api/listings/abc/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn update_then_delete_listing() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Old")).await.unwrap();

    let (status, body) = send(
        &app.router,
        Request::patch(format!("/api/listings/{}/", listing.id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"title": "New", "price": 2000.0}).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New");
    assert_eq!(body["price"], 2000.0);

    let (status, _) = send(
        &app.router,
        Request::delete(format!("/api/listings/{}/", listing.id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Soft deleted: gone from the public list, still on the owner dashboard.
    let (_, list) = send(&app.router, get("/api/listings/")).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
    let (_, mine) = send(&app.router, get("/api/listings/user/1/")).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["available"], false);
}

#[tokio::test]
async fn favorite_post_nests_listing_matching_get() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Fav")).await.unwrap();

    let (status, favorite) = send(
        &app.router,
        post_json("/api/favorites/", json!({"user_id": 1, "apartment_id": listing.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(favorite["user_id"], 1);
    assert_eq!(favorite["apartment_id"], listing.id);

    let (_, direct) = send(&app.router, get(&format!("/api/listings/{}/", listing.id))).await;
    assert_eq!(favorite["listing"], direct);

    let (_, check) = send(
        &app.router,
        get(&format!("/api/favorites/check/1/{}/", listing.id)),
    )
    .await;
    assert_eq!(check["is_favorited"], true);
}

#[tokio::test]
async fn duplicate_favorite_is_400() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Fav")).await.unwrap();
    let body = json!({"user_id": 1, "apartment_id": listing.id});

    let (status, _) = send(&app.router, post_json("/api/favorites/", body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, error) = send(&app.router, post_json("/api/favorites/", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Already in favorites");
}

#[tokio::test]
async fn favorite_for_missing_listing_is_400() {
    let app = test_app(FakeStore::default());
    let (status, error) = send(
        &app.router,
        post_json("/api/favorites/", json!({"user_id": 1, "apartment_id": 500})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Listing does not exist");
}

#[tokio::test]
async fn favorites_list_and_delete() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Fav")).await.unwrap();
    let favorite = app.repo.create_favorite(9, listing.id).await.unwrap();

    let (status, list) = send(&app.router, get("/api/favorites/9/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["listing"]["title"], "Fav");

    let (status, _) = send(
        &app.router,
        Request::delete(format!("/api/favorites/delete/{}/", favorite.id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app.router, get("/api/favorites/9/")).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

fn multipart_request(path: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::post(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn image_upload_assigns_sequential_order() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Photos")).await.unwrap();
    let id = listing.id.to_string();

    for expected in 0..3 {
        let (status, image) = send(
            &app.router,
            multipart_request(
                "/api/images/upload/",
                &[
                    ("image", Some("room.jpg"), b"jpegdata"),
                    ("listing_id", None, id.as_bytes()),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image["order"], expected);
    }

    let (_, images) = send(&app.router, get(&format!("/api/images/{}/", listing.id))).await;
    assert_eq!(images.as_array().unwrap().len(), 3);
    assert_eq!(app.store.uploads.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn image_label_stores_empty_string_not_null() {
    let app = test_app(FakeStore::default());
    let listing = app.repo.create_listing(seeded_listing("Photos")).await.unwrap();
    let id = listing.id.to_string();

    // Blank label field echoes "".
    let (status, image) = send(
        &app.router,
        multipart_request(
            "/api/images/upload/",
            &[
                ("image", Some("room.jpg"), b"jpegdata"),
                ("listing_id", None, id.as_bytes()),
                ("label", None, b""),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(image["label"], "");

    // Omitted label field defaults to "" as well.
    let (_, image) = send(
        &app.router,
        multipart_request(
            "/api/images/upload/",
            &[
                ("image", Some("room.jpg"), b"jpegdata"),
                ("listing_id", None, id.as_bytes()),
            ],
        ),
    )
    .await;
    assert_eq!(image["label"], "");

    // A provided label is kept as-is.
    let (_, image) = send(
        &app.router,
        multipart_request(
            "/api/images/upload/",
            &[
                ("image", Some("room.jpg"), b"jpegdata"),
                ("listing_id", None, id.as_bytes()),
                ("label", None, b"Kitchen"),
            ],
        ),
    )
    .await;
    assert_eq!(image["label"], "Kitchen");
}

#[tokio::test]
async fn image_upload_validation() {
    let app = test_app(FakeStore::default());
    let _listing = app.repo.create_listing(seeded_listing("Photos")).await.unwrap();

    // No file part at all.
    let (status, error) = send(
        &app.router,
        multipart_request("/api/images/upload/", &[("listing_id", None, b"1")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "No image file provided");

    // File but no listing_id.
    let (status, error) = send(
        &app.router,
        multipart_request("/api/images/upload/", &[("image", Some("a.jpg"), b"x")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "listing_id is required");

    // Unknown listing.
    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/images/upload/",
            &[("image", Some("a.jpg"), b"x"), ("listing_id", None, b"999")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Upload failure surfaces as 500 and records nothing.
    let failing = test_app(FakeStore {
        fail_upload: true,
        ..FakeStore::default()
    });
    let other = failing.repo.create_listing(seeded_listing("Photos")).await.unwrap();
    let other_id = other.id.to_string();
    let (status, error) = send(
        &failing.router,
        multipart_request(
            "/api/images/upload/",
            &[
                ("image", Some("a.jpg"), b"x"),
                ("listing_id", None, other_id.as_bytes()),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error["message"].as_str().unwrap().contains("Upload failed"));
    assert!(failing.repo.list_images(other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn image_delete_survives_object_store_failure() {
    let app = test_app(FakeStore {
        fail_delete: true,
        ..FakeStore::default()
    });
    let listing = app.repo.create_listing(seeded_listing("Photos")).await.unwrap();
    let image = app
        .repo
        .create_image(listing.id, "https://bucket.s3.test/listings/1/a.jpg".to_string(), None)
        .await
        .unwrap();

    let (status, _) = send(
        &app.router,
        Request::delete(format!("/api/images/delete/{}/", image.id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    // Best-effort: the record is removed even though the store errored.
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.deletes.lock().unwrap().len(), 1);
    assert!(app.repo.list_images(listing.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn universities_use_camel_case_wire_names() {
    let app = test_app(FakeStore::default());
    app.repo
        .create_university(housing_rust::models::NewUniversity {
            name: "UC Davis".to_string(),
            full_name: "University of California, Davis".to_string(),
            latitude: 38.5382,
            longitude: -121.7617,
        })
        .await
        .unwrap();

    let (status, list) = send(&app.router, get("/api/universities/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["name"], "UC Davis");
    assert_eq!(list[0]["fullName"], "University of California, Davis");
    assert_eq!(list[0]["lat"], 38.5382);
    assert_eq!(list[0]["lng"], -121.7617);
    assert!(list[0].get("full_name").is_none());
}

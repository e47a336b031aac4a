//! Book copy endpoint tests: admin CRUD, borrow and return_book

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use book_lending_server::models::{book_copy::BookCopyResponse, BorrowStatus, Role};
use common::{TestApp, TestRequest};

// index

#[tokio::test]
async fn test_index_as_admin_lists_copies() {
    let app = TestApp::new().await;
    app.create_book_copy().await;

    let response = TestRequest::get("/book_copies").api_key(&app.admin_key).send(&app.router).await;

    assert_eq!(response.status, StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["book_copies"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_index_as_user_is_unauthorized() {
    let app = TestApp::new().await;

    let response = TestRequest::get("/book_copies").api_key(&app.user_key).send(&app.router).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_or_unknown_key_is_unauthorized() {
    let app = TestApp::new().await;

    let response = TestRequest::get("/book_copies").send(&app.router).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = TestRequest::get("/book_copies").api_key("not-a-key").send(&app.router).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "NotAuthorized");

    let copy = app.create_book_copy().await;
    let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
        .api_key("not-a-key")
        .json(&json!({ "user_id": app.user.id }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quoted_token_and_bearer_are_accepted() {
    let app = TestApp::new().await;

    let response = TestRequest::get("/book_copies")
        .header("authorization", &format!("Token token=\"{}\"", app.admin_key))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = TestRequest::get("/book_copies")
        .header("authorization", &format!("Bearer {}", app.admin_key))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

// show

#[tokio::test]
async fn test_show_as_admin_matches_serializer() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::get(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let expected = serde_json::to_string(&BookCopyResponse::from(&copy)).unwrap();
    assert_eq!(response.text(), expected);
}

#[tokio::test]
async fn test_show_as_user_is_unauthorized() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::get(&format!("/book_copies/{}", copy.id))
        .api_key(&app.user_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_show_unknown_copy_is_not_found() {
    let app = TestApp::new().await;

    let response = TestRequest::get("/book_copies/9999")
        .api_key(&app.admin_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// create

#[tokio::test]
async fn test_create_with_valid_params() {
    let app = TestApp::new().await;
    let before = app.book_copy_count().await;

    let response = TestRequest::post("/book_copies")
        .api_key(&app.admin_key)
        .json(&json!({
            "book_copy": {
                "isbn": "00001",
                "published": "2026-10-19",
                "book_id": app.book.id,
                "format": "hardback"
            }
        }))
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(app.book_copy_count().await, before + 1);
    let body: Value = response.json();
    assert_eq!(body["book_copy"]["isbn"], "00001");
    assert_eq!(body["book_copy"]["user_id"], Value::Null);
}

#[tokio::test]
async fn test_create_with_invalid_params() {
    let app = TestApp::new().await;
    let before = app.book_copy_count().await;

    let response = TestRequest::post("/book_copies")
        .api_key(&app.admin_key)
        .json(&json!({ "book_copy": { "isbn": "00001" } }))
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.book_copy_count().await, before);
}

#[tokio::test]
async fn test_create_with_unknown_book_or_format() {
    let app = TestApp::new().await;

    for book_copy in [
        json!({ "isbn": "00001", "published": "2020-01-01", "book_id": 9999, "format": "hardback" }),
        json!({ "isbn": "00001", "published": "2020-01-01", "book_id": app.book.id, "format": "scroll" }),
    ] {
        let response = TestRequest::post("/book_copies")
            .api_key(&app.admin_key)
            .json(&json!({ "book_copy": book_copy }))
            .send(&app.router)
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert_eq!(app.book_copy_count().await, 0);
}

#[tokio::test]
async fn test_create_without_body() {
    let app = TestApp::new().await;

    let response = TestRequest::post("/book_copies").api_key(&app.admin_key).send(&app.router).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "BadValue");
    assert_eq!(app.book_copy_count().await, 0);
}

#[tokio::test]
async fn test_create_with_unparseable_attributes() {
    let app = TestApp::new().await;

    for book_copy in [
        json!({ "isbn": "00001", "published": "garbage", "book_id": app.book.id, "format": "hardback" }),
        json!({ "isbn": 123, "published": "2020-01-01", "book_id": app.book.id, "format": "hardback" }),
    ] {
        let response = TestRequest::post("/book_copies")
            .api_key(&app.admin_key)
            .json(&json!({ "book_copy": book_copy }))
            .send(&app.router)
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], 6);
        assert_eq!(body["error"], "BadValue");
        assert!(body["message"].is_string());
    }
    assert_eq!(app.book_copy_count().await, 0);
}

#[tokio::test]
async fn test_create_as_user_is_unauthorized() {
    let app = TestApp::new().await;

    let response = TestRequest::post("/book_copies")
        .api_key(&app.user_key)
        .json(&json!({ "book_copy": { "isbn": "00001" } }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// update

#[tokio::test]
async fn test_update_with_valid_params() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "book_copy": { "isbn": "0000033" } }))
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let reloaded = app.reload(copy.id).await;
    assert_eq!(reloaded.isbn, "0000033");
    let expected = serde_json::to_string(&BookCopyResponse::from(&reloaded)).unwrap();
    assert_eq!(response.text(), expected);
}

#[tokio::test]
async fn test_update_with_null_isbn() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "book_copy": { "isbn": null } }))
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.reload(copy.id).await.isbn, copy.isbn);
}

#[tokio::test]
async fn test_update_with_null_attributes() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    for field in ["published", "format", "book_id"] {
        let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
            .api_key(&app.admin_key)
            .json(&json!({ "book_copy": { field: null } }))
            .send(&app.router)
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{} = null", field);
    }
    assert_eq!(app.reload(copy.id).await, copy);
}

#[tokio::test]
async fn test_update_cannot_set_borrower() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "book_copy": { "user_id": app.user.id } }))
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
    let body: Value = response.json();
    assert_eq!(body["book_copy"]["user_id"], Value::Null);
}

#[tokio::test]
async fn test_update_without_body() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "BadValue");
    assert_eq!(app.reload(copy.id).await, copy);
}

#[tokio::test]
async fn test_update_as_user_is_unauthorized() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}", copy.id))
        .api_key(&app.user_key)
        .json(&json!({ "book_copy": { "isbn": "0000033" } }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.reload(copy.id).await.isbn, copy.isbn);
}

// destroy

#[tokio::test]
async fn test_destroy_as_admin() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    let before = app.book_copy_count().await;

    let response = TestRequest::delete(&format!("/book_copies/{}", copy.id))
        .api_key(&app.admin_key)
        .send(&app.router)
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.book_copy_count().await, before - 1);
}

#[tokio::test]
async fn test_destroy_as_user_is_unauthorized() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::delete(&format!("/book_copies/{}", copy.id))
        .api_key(&app.user_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.book_copy_count().await, 1);
}

// borrow

#[tokio::test]
async fn test_borrow_without_user_id() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    for key in [&app.admin_key, &app.user_key] {
        let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
            .api_key(key)
            .send(&app.router)
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
}

#[tokio::test]
async fn test_borrow_available_copy() {
    let app = TestApp::new().await;

    for key in [&app.admin_key, &app.user_key] {
        let copy = app.create_book_copy().await;
        let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
            .api_key(key)
            .json(&json!({ "user_id": app.user.id }))
            .send(&app.router)
            .await;

        assert_eq!(response.status, StatusCode::OK);
        let reloaded = app.reload(copy.id).await;
        assert_eq!(reloaded.status, BorrowStatus::Borrowed(app.user.id));
        let expected = serde_json::to_string(&BookCopyResponse::from(&reloaded)).unwrap();
        assert_eq!(response.text(), expected);
    }
}

#[tokio::test]
async fn test_borrow_already_borrowed_copy() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    app.set_borrower(copy.id, app.admin.id).await;

    for key in [&app.admin_key, &app.user_key] {
        let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
            .api_key(key)
            .json(&json!({ "user_id": app.user.id }))
            .send(&app.router)
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Borrowed(app.admin.id));
}

#[tokio::test]
async fn test_borrow_for_unknown_user() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "user_id": 9999 }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_borrow_with_unparseable_user_id() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    for user_id in [json!("abc"), json!(4_294_967_296i64)] {
        let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
            .api_key(&app.admin_key)
            .json(&json!({ "user_id": user_id }))
            .send(&app.router)
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "BadValue");
        assert!(!body["message"].as_str().unwrap().contains("required"));
    }
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
}

#[tokio::test]
async fn test_concurrent_borrows_only_one_wins() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    let (other, _) = app.create_user(Role::User).await;
    let uri = format!("/book_copies/{}/borrow", copy.id);

    let (first, second) = tokio::join!(
        TestRequest::put(&uri)
            .api_key(&app.user_key)
            .json(&json!({ "user_id": app.user.id }))
            .send(&app.router),
        TestRequest::put(&uri)
            .api_key(&app.user_key)
            .json(&json!({ "user_id": other.id }))
            .send(&app.router),
    );

    let mut statuses = [first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY]);
    assert!(app.reload(copy.id).await.status.is_borrowed());
}

// return_book

#[tokio::test]
async fn test_admin_return_without_user_id() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    app.set_borrower(copy.id, app.user.id).await;

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.admin_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Borrowed(app.user.id));
}

#[tokio::test]
async fn test_return_of_available_copy() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;

    for key in [&app.admin_key, &app.user_key] {
        let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
            .api_key(key)
            .json(&json!({ "user_id": app.user.id }))
            .send(&app.router)
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn test_admin_return_for_matching_borrower() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    app.set_borrower(copy.id, app.user.id).await;

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "user_id": app.user.id }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
}

#[tokio::test]
async fn test_admin_return_for_other_borrower() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    let (another_user, _) = app.create_user(Role::User).await;
    app.set_borrower(copy.id, another_user.id).await;

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.admin_key)
        .json(&json!({ "user_id": app.user.id }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
}

#[tokio::test]
async fn test_user_return_of_own_copy() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    app.set_borrower(copy.id, app.user.id).await;

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.user_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["book_copy"]["user_id"], Value::Null);
}

#[tokio::test]
async fn test_user_return_of_someone_elses_copy() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    let (another_user, _) = app.create_user(Role::User).await;
    app.set_borrower(copy.id, another_user.id).await;

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.user_key)
        .json(&json!({ "user_id": another_user.id }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Borrowed(another_user.id));
}

#[tokio::test]
async fn test_borrow_and_return_round_trip() {
    let app = TestApp::new().await;
    let copy = app.create_book_copy().await;
    let (other, other_key) = app.create_user(Role::User).await;
    assert_ne!(other.id, app.user.id);

    let response = TestRequest::put(&format!("/book_copies/{}/borrow", copy.id))
        .api_key(&app.user_key)
        .json(&json!({ "user_id": app.user.id }))
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Borrowed(app.user.id));

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&other_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = TestRequest::put(&format!("/book_copies/{}/return_book", copy.id))
        .api_key(&app.user_key)
        .send(&app.router)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.reload(copy.id).await.status, BorrowStatus::Available);
}

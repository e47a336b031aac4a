//! Shared helpers for driving the router in-process over in-memory storage
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;

use book_lending_server::{
    api,
    config::AppConfig,
    models::{
        author::CreateAuthor,
        book::CreateBook,
        book_copy::CreateBookCopy,
        user::CreateUser,
        Book, BookCopy, Role, User,
    },
    repository::Repository,
    services::Services,
    AppState,
};

/// A fresh application with one admin, one regular user and one book
pub struct TestApp {
    pub router: Router,
    pub services: Services,
    pub repository: Repository,
    pub admin: User,
    pub admin_key: String,
    pub user: User,
    pub user_key: String,
    pub book: Book,
}

impl TestApp {
    pub async fn new() -> Self {
        let repository = Repository::in_memory();
        let services = Services::new(repository.clone());
        let router = api::create_router(AppState::new(AppConfig::default(), services.clone()));

        let (admin, admin_key) = create_user(&services, Role::Admin).await;
        let (user, user_key) = create_user(&services, Role::User).await;

        let author = services
            .catalog
            .create_author(CreateAuthor {
                first_name: Some("Ursula".to_string()),
                last_name: Some("Le Guin".to_string()),
            })
            .await
            .expect("Failed to create author");
        let book = services
            .catalog
            .create_book(CreateBook {
                title: Some("A Wizard of Earthsea".to_string()),
                author_id: Some(author.id),
            })
            .await
            .expect("Failed to create book");

        Self {
            router,
            services,
            repository,
            admin,
            admin_key,
            user,
            user_key,
            book,
        }
    }

    pub async fn create_user(&self, role: Role) -> (User, String) {
        create_user(&self.services, role).await
    }

    pub async fn create_book_copy(&self) -> BookCopy {
        self.services
            .book_copies
            .create(CreateBookCopy {
                isbn: Some("9780547773742".to_string()),
                published: NaiveDate::from_ymd_opt(1968, 11, 1),
                book_id: Some(self.book.id),
                format: Some("paperback".to_string()),
            })
            .await
            .expect("Failed to create book copy")
    }

    /// Mark a copy as borrowed by `user_id` directly in storage
    pub async fn set_borrower(&self, copy_id: i32, user_id: i32) {
        self.repository
            .book_copies
            .borrow(copy_id, user_id)
            .await
            .expect("Failed to set borrower")
            .expect("Copy was already borrowed");
    }

    pub async fn reload(&self, copy_id: i32) -> BookCopy {
        self.repository
            .book_copies
            .get_by_id(copy_id)
            .await
            .expect("Failed to reload book copy")
    }

    pub async fn book_copy_count(&self) -> usize {
        self.repository
            .book_copies
            .list()
            .await
            .expect("Failed to list book copies")
            .len()
    }
}

async fn create_user(services: &Services, role: Role) -> (User, String) {
    static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    services
        .users
        .create_user(CreateUser {
            email: Some(format!("{}{}@example.org", role, n)),
            first_name: Some("Test".to_string()),
            last_name: Some(format!("User{}", n)),
            role: Some(role),
        })
        .await
        .expect("Failed to create user")
}

/// Helper to build and execute HTTP requests against the router
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: format!("/api/v1{}", uri),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Authenticate with `Authorization: Token token=<key>`
    pub fn api_key(self, key: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), &format!("Token token={}", key))
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.headers
            .push((header::CONTENT_TYPE.as_str().to_owned(), "application/json".to_owned()));
        self
    }

    pub async fn send(self, app: &Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);

        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }

        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        TestResponse { status, body }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Failed to decode response as UTF-8")
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use annotator_api::auth::jwt::{generate_access_token, JwtConfig};
use annotator_api::config::ServerConfig;
use annotator_api::router::build_app_router;
use annotator_api::state::AppState;
use annotator_db::models::user::CreateUser;
use annotator_db::repositories::UserRepo;

pub const MULTIPART_BOUNDARY: &str = "annotator-test-boundary";

/// Build a test `ServerConfig` with safe defaults and a small page size.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        texts_page_size: 2,
        jwt: test_jwt(),
    }
}

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-for-integration-tests".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

/// A registered user and a bearer token for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

pub async fn create_user(pool: &PgPool, username: &str) -> TestUser {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
        },
    )
    .await
    .expect("create user");
    let token = generate_access_token(user.id, &user.username, &test_jwt()).expect("token");
    TestUser {
        id: user.id,
        username: user.username,
        token,
    }
}

/// `/api/v1/users/{owner}/projects/{no}` plus `suffix`.
pub fn project_url(owner_id: i64, project_no: i64, suffix: &str) -> String {
    format!("/api/v1/users/{owner_id}/projects/{project_no}{suffix}")
}

/// Create a project over HTTP and return its `data` object.
pub async fn create_project(pool: &PgPool, user: &TestUser, name: &str) -> serde_json::Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/projects",
        &user.token,
        serde_json::json!({ "name": name }),
    )
    .await;
    body_json(response).await["data"].clone()
}

/// Create a text over HTTP and return its storage id.
pub async fn create_text(
    pool: &PgPool,
    user: &TestUser,
    project_no: i64,
    text_id: &str,
    content: &str,
) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &project_url(user.id, project_no, "/texts"),
        &user.token,
        serde_json::json!({ "text_id": text_id, "text": content }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn authed(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response {
    send(app, authed(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn get_anonymous(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, authed(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, json: serde_json::Value) -> Response {
    json_request(app, Method::POST, uri, token, json).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, json: serde_json::Value) -> Response {
    json_request(app, Method::PUT, uri, token, json).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    json: serde_json::Value,
) -> Response {
    let request = authed(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

/// A multipart form part: either a text field or a file.
pub enum Part<'a> {
    Field(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

/// Encode `parts` as `multipart/form-data` with [`MULTIPART_BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.csv\"\r\n\
                         Content-Type: text/csv\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, token: &str, parts: &[Part<'_>]) -> Response {
    let request = authed(Method::POST, uri, token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

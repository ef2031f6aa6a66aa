use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use bazaar_engine::db_types::UserId;
use chrono::Duration;
use log::debug;

use crate::{
    auth::{TokenIssuer, TokenVerifier},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("b3c1f0a9e2d8476a9c5e0f7d6b4a3928e1d0c9b8a7f6e5d4")
}

pub fn issue_token(user: &str) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(UserId::from(user), None).expect("Failed to sign token")
}

pub fn expired_token(user: &str) -> String {
    TokenIssuer::new(&get_auth_config())
        .issue_token(UserId::from(user), Some(Duration::minutes(-5)))
        .expect("Failed to sign token")
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    send(with_token(TestRequest::get().uri(path), token), configure).await
}

pub async fn post_request(
    token: &str,
    path: &str,
    body: serde_json::Value,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    send(with_token(TestRequest::post().uri(path).set_json(body), token), configure).await
}

pub async fn put_request(
    token: &str,
    path: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    send(with_token(TestRequest::put().uri(path), token), configure).await
}

pub fn with_token(req: TestRequest, token: &str) -> TestRequest {
    if token.is_empty() {
        req
    } else {
        req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    }
}

pub async fn send(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let verifier = TokenVerifier::new(&get_auth_config());
    let app = App::new().app_data(web::Data::new(verifier)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}

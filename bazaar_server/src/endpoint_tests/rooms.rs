use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use bazaar_engine::{
    db_types::{DisputeId, ParticipantRole},
    AccessGate,
    DisputeApi,
    Hub,
    HubConfig,
};
use serde_json::json;

use super::helpers::{get_auth_config, get_request, issue_token, post_request, send, with_token};
use crate::{
    auth::TokenVerifier,
    endpoint_tests::mocks::MockBackend,
    routes::{health, rooms, CreateRoomRoute, JoinRoomRoute},
};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/health", |cfg: &mut ServiceConfig| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn list_rooms_needs_no_token() {
    let _ = env_logger::try_init().ok();
    let hub = Hub::start(HubConfig::default());
    hub.create_room(DisputeId::from("dispute-b")).await;
    hub.create_room(DisputeId::from("dispute-a")).await;
    let (status, body) = get_request("", "/ws/rooms", configure(MockBackend::new(), MockBackend::new(), hub)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":"dispute-a"},{"id":"dispute-b"}]"#);
}

#[actix_web::test]
async fn create_room_as_party() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().times(1).returning(|_, _| Ok(Some(ParticipantRole::Buyer)));
    let hub = Hub::start(HubConfig::default());
    let token = issue_token("buyer");
    let body = json!({"id": "dispute-1"});
    let (status, _) = post_request(&token, "/ws/create", body, configure(gate, MockBackend::new(), hub.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hub.list_rooms().await, vec![DisputeId::from("dispute-1")]);
}

#[actix_web::test]
async fn create_room_as_stranger() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Unrelated)));
    let hub = Hub::start(HubConfig::default());
    let token = issue_token("stranger");
    let body = json!({"id": "dispute-1"});
    let (status, _) = post_request(&token, "/ws/create", body, configure(gate, MockBackend::new(), hub.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(hub.list_rooms().await.is_empty());
}

#[actix_web::test]
async fn create_room_no_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({"id": "dispute-1"});
    let hub = Hub::start(HubConfig::default());
    let (status, _) = post_request("", "/ws/create", body, configure(MockBackend::new(), MockBackend::new(), hub)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn join_without_token_is_refused_before_upgrade() {
    let _ = env_logger::try_init().ok();
    let hub = Hub::start(HubConfig::default());
    let req = upgrade_request("/ws/join/dispute-1?username=Bob");
    let (status, _) = send(req, configure(MockBackend::new(), MockBackend::new(), hub)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn join_as_stranger_is_refused_before_upgrade() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Unrelated)));
    let hub = Hub::start(HubConfig::default());
    let token = issue_token("stranger");
    let req = with_token(upgrade_request("/ws/join/dispute-1?username=Eve"), &token);
    let (status, _) = send(req, configure(gate, MockBackend::new(), hub.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(hub.room_members(DisputeId::from("dispute-1")).await.is_empty());
}

#[actix_web::test]
async fn join_resolved_dispute_is_refused() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Resolved)));
    let token = issue_token("buyer");
    let req = with_token(upgrade_request("/ws/join/dispute-1"), &token);
    let (status, _) = send(req, configure(gate, MockBackend::new(), Hub::start(HubConfig::default()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn join_unknown_dispute() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(None));
    let token = issue_token("buyer");
    let req = with_token(upgrade_request("/ws/join/nope"), &token);
    let (status, _) = send(req, configure(gate, MockBackend::new(), Hub::start(HubConfig::default()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn join_without_upgrade_headers() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Buyer)));
    let token = issue_token("buyer");
    let (status, _) =
        get_request(&token, "/ws/join/dispute-1", configure(gate, MockBackend::new(), Hub::start(HubConfig::default())))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn join_as_party_upgrades() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    gate.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Seller)));
    let token = issue_token("seller");
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .configure(configure(gate, MockBackend::new(), Hub::start(HubConfig::default())));
    let service = test::init_service(app).await;
    let req = with_token(upgrade_request("/ws/join/dispute-1?username=Sam"), &token).to_request();
    // The body of an upgraded response is the socket itself, so only the status is checked
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::SWITCHING_PROTOCOLS);
}

#[actix_web::test]
async fn join_racing_a_close_leaves_no_live_room() {
    let _ = env_logger::try_init().ok();
    let mut gate = MockBackend::new();
    // Open when the join is checked, resolved by the time the connection is registered
    let mut checks = 0;
    gate.expect_role_for_dispute().times(2).returning(move |_, _| {
        checks += 1;
        if checks == 1 {
            Ok(Some(ParticipantRole::Buyer))
        } else {
            Ok(Some(ParticipantRole::Resolved))
        }
    });
    let hub = Hub::start(HubConfig::default());
    let token = issue_token("buyer");
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .configure(configure(gate, MockBackend::new(), hub.clone()));
    let service = test::init_service(app).await;
    let req = with_token(upgrade_request("/ws/join/dispute-1?username=Bob"), &token).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::SWITCHING_PROTOCOLS);
    assert!(hub.list_rooms().await.is_empty());
    assert!(hub.room_members(DisputeId::from("dispute-1")).await.is_empty());
}

fn upgrade_request(path: &str) -> TestRequest {
    TestRequest::get()
        .uri(path)
        .insert_header((header::UPGRADE, "websocket"))
        .insert_header((header::CONNECTION, "upgrade"))
        .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
        .insert_header((header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ=="))
}

fn configure(gate: MockBackend, db: MockBackend, hub: Hub) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(rooms)
            .service(CreateRoomRoute::<MockBackend>::new())
            .service(JoinRoomRoute::<MockBackend>::new())
            .app_data(web::Data::new(AccessGate::new(gate)))
            .app_data(web::Data::new(DisputeApi::new(db)))
            .app_data(web::Data::new(hub));
    }
}

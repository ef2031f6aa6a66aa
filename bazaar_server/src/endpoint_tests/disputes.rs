use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bazaar_engine::{
    db_types::{Dispute, DisputeId, DisputeImage, ImageId, OrderId, ParticipantRole, PersistedMessage, UserId},
    traits::DisputeManagementError,
    DisputeApi,
    Hub,
    HubConfig,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use super::helpers::{expired_token, get_request, issue_token, post_request, put_request, send};
use crate::{
    endpoint_tests::mocks::MockBackend,
    routes::{AddDisputeImageRoute, CloseDisputeRoute, CreateDisputeRoute, DisputeForOrderRoute, MessageHistoryRoute},
};

#[actix_web::test]
async fn create_dispute_no_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({"orderId": "order-1", "dispute": "The parcel never arrived"});
    let (status, body) = post_request("", "/disputes", body, configure(MockBackend::new(), Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn create_dispute_expired_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({"orderId": "order-1", "dispute": "The parcel never arrived"});
    let token = expired_token("buyer");
    let (status, _) = post_request(&token, "/disputes", body, configure(MockBackend::new(), Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_dispute_as_buyer() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_order().times(1).returning(|_, _| Ok(Some(ParticipantRole::Buyer)));
    db.expect_insert_dispute().times(1).returning(|d| {
        assert_eq!(d.order_id, OrderId::from("order-1"));
        assert_eq!(d.description, "The parcel never arrived");
        Ok(Dispute { id: DisputeId::from("dispute-1"), ..dispute() })
    });
    db.expect_insert_dispute_image().times(2).returning(|id, url| Ok(image(id, url)));
    let body = json!({
        "orderId": "order-1",
        "dispute": "The parcel never arrived",
        "images": ["https://img.example/1.png", "https://img.example/2.png"]
    });
    let token = issue_token("buyer");
    let (status, body) = post_request(&token, "/disputes", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, r#"{"id":"dispute-1"}"#);
}

#[actix_web::test]
async fn create_dispute_as_stranger() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_order().returning(|_, _| Ok(Some(ParticipantRole::Unrelated)));
    db.expect_insert_dispute().never();
    let body = json!({"orderId": "order-1", "dispute": "Not my order, but I have opinions"});
    let token = issue_token("stranger");
    let (status, _) = post_request(&token, "/disputes", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_second_dispute_for_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_order().returning(|_, _| Ok(Some(ParticipantRole::Seller)));
    db.expect_insert_dispute()
        .returning(|d| Err(DisputeManagementError::DisputeAlreadyExists(d.order_id.clone())));
    let body = json!({"orderId": "order-1", "dispute": "Buyer claims damage"});
    let token = issue_token("seller");
    let (status, _) = post_request(&token, "/disputes", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn create_dispute_without_description() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_order().never();
    let body = json!({"orderId": "order-1", "dispute": "   "});
    let token = issue_token("buyer");
    let (status, _) = post_request(&token, "/disputes", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fetch_dispute_for_order_opens_its_room() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_dispute_for_order().returning(|_| Ok(Some(dispute())));
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Seller)));
    db.expect_fetch_images_for_dispute()
        .returning(|id| Ok(vec![image(id, "https://img.example/1.png")]));
    let hub = Hub::start(cfg());
    let token = issue_token("seller");
    let (status, body) = get_request(&token, "/disputes/order/order-1", configure(db, hub.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], "dispute-1");
    assert_eq!(body["order_id"], "order-1");
    assert_eq!(body["resolved"], false);
    assert_eq!(body["images"][0]["image_url"], "https://img.example/1.png");
    assert_eq!(hub.list_rooms().await, vec![DisputeId::from("dispute-1")]);
}

#[actix_web::test]
async fn fetch_dispute_for_order_without_one() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_dispute_for_order().returning(|_| Ok(None));
    let hub = Hub::start(cfg());
    let token = issue_token("buyer");
    let (status, _) = get_request(&token, "/disputes/order/order-9", configure(db, hub.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(hub.list_rooms().await.is_empty());
}

#[actix_web::test]
async fn close_dispute_as_party() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Buyer)));
    db.expect_mark_dispute_resolved().times(1).returning(|_| Ok(true));
    let hub = Hub::start(cfg());
    hub.create_room(DisputeId::from("dispute-1")).await;
    let token = issue_token("buyer");
    let (status, body) = put_request(&token, "/disputes/dispute-1", configure(db, hub.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert!(hub.list_rooms().await.is_empty());
}

#[actix_web::test]
async fn close_resolved_dispute() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Resolved)));
    db.expect_mark_dispute_resolved().never();
    let token = issue_token("buyer");
    let (status, _) = put_request(&token, "/disputes/dispute-1", configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn add_image_to_unknown_dispute() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(None));
    let body = json!({"url": "https://img.example/3.png"});
    let token = issue_token("buyer");
    let (status, _) = post_request(&token, "/disputes/nope/images", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn add_image() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Seller)));
    db.expect_insert_dispute_image().times(1).returning(|id, url| Ok(image(id, url)));
    let body = json!({"url": "https://img.example/3.png"});
    let token = issue_token("seller");
    let (status, body) = post_request(&token, "/disputes/dispute-1/images", body, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["dispute_id"], "dispute-1");
    assert_eq!(body["image_url"], "https://img.example/3.png");
}

#[actix_web::test]
async fn message_history_for_stranger() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Unrelated)));
    db.expect_fetch_messages_for_dispute().never();
    let token = issue_token("stranger");
    let (status, _) = get_request(&token, "/disputes/dispute-1/messages", configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn message_history_with_query_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_role_for_dispute().returning(|_, _| Ok(Some(ParticipantRole::Buyer)));
    db.expect_fetch_messages_for_dispute().returning(|id| {
        Ok(vec![PersistedMessage {
            id: 1,
            dispute_id: id.clone(),
            sender_id: UserId::from("seller"),
            content: "Can you send a photo?".to_string(),
            created_at: timestamp(),
        }])
    });
    let token = issue_token("buyer");
    let req = TestRequest::get().uri(&format!("/disputes/dispute-1/messages?access_token={token}"));
    let (status, body) = send(req, configure(db, Hub::start(cfg()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"id":1,"dispute_id":"dispute-1","sender_id":"seller","content":"Can you send a photo?","created_at":"2024-05-01T10:00:00Z"}]"#
    );
}

fn cfg() -> HubConfig {
    HubConfig::default()
}

fn configure(db: MockBackend, hub: Hub) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(DisputeForOrderRoute::<MockBackend>::new())
            .service(CreateDisputeRoute::<MockBackend>::new())
            .service(CloseDisputeRoute::<MockBackend>::new())
            .service(AddDisputeImageRoute::<MockBackend>::new())
            .service(MessageHistoryRoute::<MockBackend>::new())
            .app_data(web::Data::new(DisputeApi::new(db)))
            .app_data(web::Data::new(hub));
    }
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

fn dispute() -> Dispute {
    Dispute {
        id: DisputeId::from("dispute-1"),
        order_id: OrderId::from("order-1"),
        description: "The parcel never arrived".to_string(),
        resolved: false,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn image(id: &DisputeId, url: &str) -> DisputeImage {
    DisputeImage { id: ImageId::random(), dispute_id: id.clone(), image_url: url.to_string(), created_at: timestamp() }
}

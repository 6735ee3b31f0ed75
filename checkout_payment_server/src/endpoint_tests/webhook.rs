use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_payment_engine::{
    db_types::{PaymentMethod, PaymentStatus},
    helpers::webhook_signature,
    OrderFlowApi,
};
use cpg_common::Secret;
use serde_json::json;

use super::{
    helpers::{send_request, TEST_GATEWAY_SECRET, TEST_WEBHOOK_SECRET},
    mocks::{sample_order, MockOrderDb},
};
use crate::{config::GatewayConfig, webhook_routes::gateway_webhook};

fn configure_with(cfg: &mut ServiceConfig, db: MockOrderDb) {
    let api = OrderFlowApi::new(db, Secret::new(TEST_GATEWAY_SECRET.to_string()));
    let gateway = GatewayConfig {
        webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
        ..GatewayConfig::default()
    };
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(gateway))
        .route("/payments/webhook", web::post().to(gateway_webhook::<MockOrderDb>));
}

fn captured_event_body() -> Vec<u8> {
    json!({
        "event": "payment.captured",
        "payload": { "payment": { "entity": { "order_id": "order_abc", "id": "pay_xyz", "status": "captured" } } }
    })
    .to_string()
    .into_bytes()
}

fn signed_request(body: Vec<u8>) -> TestRequest {
    let signature = webhook_signature(TEST_WEBHOOK_SECRET, &body);
    TestRequest::post().uri("/payments/webhook").insert_header(("X-Signature", signature)).set_payload(body)
}

#[actix_web::test]
async fn missing_signature_is_a_400() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::post().uri("/payments/webhook").set_payload(captured_event_body());
    let (status, _) = send_request(req, "", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn bad_signature_is_a_400() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::post()
        .uri("/payments/webhook")
        .insert_header(("X-Signature", "0".repeat(64)))
        .set_payload(captured_event_body());
    let (status, _) = send_request(req, "", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn captured_event_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_by_gateway_order_id().returning(|gid| {
            let mut order = sample_order(7, "alice", PaymentStatus::Pending);
            order.payment_method = PaymentMethod::Gateway;
            order.gateway_order_id = Some(gid.to_string());
            Ok(Some(order))
        });
        db.expect_settle_payment().returning(|id, status, payment_id, reconciled_at| {
            let mut order = sample_order(id, "alice", status);
            order.payment_method = PaymentMethod::Gateway;
            order.gateway_payment_id = payment_id;
            order.reconciled_at = Some(reconciled_at);
            Ok(Some(order))
        });
        configure_with(cfg, db);
    };
    let (status, body) = send_request(signed_request(captured_event_body()), "", configure).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["status"], "ok");
    assert_eq!(outcome["outcome"], "applied");
    assert_eq!(outcome["order"]["paymentStatus"], "completed");
    assert_eq!(outcome["order"]["gatewayPaymentId"], "pay_xyz");
}

#[actix_web::test]
async fn duplicate_event_is_acknowledged_as_a_no_op() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_by_gateway_order_id().returning(|gid| {
            let mut order = sample_order(7, "alice", PaymentStatus::Completed);
            order.gateway_order_id = Some(gid.to_string());
            Ok(Some(order))
        });
        db.expect_settle_payment().returning(|_, _, _, _| Ok(None));
        db.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id, "alice", PaymentStatus::Completed))));
        configure_with(cfg, db);
    };
    let (status, body) = send_request(signed_request(captured_event_body()), "", configure).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "already_processed");
    assert_eq!(outcome["paymentStatus"], "completed");
}

#[actix_web::test]
async fn orphaned_event_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_by_gateway_order_id().returning(|_| Ok(None));
        configure_with(cfg, db);
    };
    let (status, body) = send_request(signed_request(captured_event_body()), "", configure).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "orphaned");
    assert_eq!(outcome["gatewayOrderId"], "order_abc");
}

#[actix_web::test]
async fn unhandled_event_types_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let body = json!({ "event": "refund.processed", "payload": {} }).to_string().into_bytes();
    let (status, body) = send_request(signed_request(body), "", configure).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "ignored");
}

#[actix_web::test]
async fn verified_but_unparseable_payload_is_discarded() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let (status, body) = send_request(signed_request(b"not json at all".to_vec()), "", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("discarded"), "unexpected body: {body}");
}

#[actix_web::test]
async fn missing_webhook_secret_is_a_500() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(MockOrderDb::new(), Secret::new(TEST_GATEWAY_SECRET.to_string()));
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(GatewayConfig::default()))
            .route("/payments/webhook", web::post().to(gateway_webhook::<MockOrderDb>));
    };
    let (status, _) = send_request(signed_request(captured_event_body()), "", configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_payment_engine::{
    db_types::PaymentStatus,
    helpers::checkout_signature,
    traits::StatusOverrideResult,
    OrderFlowApi,
};
use cpg_common::Secret;
use serde_json::json;

use super::{
    helpers::{issue_token, send_request, TEST_GATEWAY_SECRET},
    mocks::{sample_order, MockOrderDb, StubGateway},
};
use crate::routes::{checkout_gateway, create_order, my_orders, order_by_id, update_order_status};

fn configure_with(cfg: &mut ServiceConfig, db: MockOrderDb) {
    let api = OrderFlowApi::new(db, Secret::new(TEST_GATEWAY_SECRET.to_string()));
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(StubGateway))
        .route("/orders", web::post().to(create_order::<MockOrderDb>))
        .route("/orders", web::get().to(my_orders::<MockOrderDb>))
        .route("/orders/{id}", web::get().to(order_by_id::<MockOrderDb>))
        .route("/admin/orders/{id}/status", web::put().to(update_order_status::<MockOrderDb>))
        .route("/checkout/gateway", web::post().to(checkout_gateway::<StubGateway>));
}

fn cod_order_body() -> serde_json::Value {
    json!({
        "items": [{ "id": "p-100", "name": "Chyawanprash 500g", "price": 199.5, "quantity": 2 }],
        "shippingAddress": {
            "line1": "12 MG Road", "city": "Pune", "state": "MH", "postalCode": "411001", "country": "IN"
        },
        "paymentMethod": "cod"
    })
}

#[actix_web::test]
async fn create_cod_order() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_insert_order().returning(|new_order| {
            let mut order = sample_order(1, &new_order.owner_id, new_order.payment_status);
            order.estimated_delivery_date = new_order.estimated_delivery_date;
            Ok(order)
        });
        configure_with(cfg, db);
    };
    let req = TestRequest::post().uri("/orders").set_json(cod_order_body());
    let (status, body) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["paymentStatus"], "processing");
    assert_eq!(order["totalAmount"], 399.0);
    assert_eq!(order["ownerId"], "alice");
    assert!(order["estimatedDeliveryDate"].is_string());
}

#[actix_web::test]
async fn create_order_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::post().uri("/orders").set_json(cod_order_body());
    let (status, _) = send_request(req, "", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_payment_method_is_a_400() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let mut body = cod_order_body();
    body["paymentMethod"] = json!("upi");
    let req = TestRequest::post().uri("/orders").set_json(body);
    let (status, _) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn gateway_order_with_bad_signature_is_a_400() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let mut body = cod_order_body();
    body["paymentMethod"] = json!("gateway");
    body["gatewayConfirmation"] =
        json!({ "orderId": "order_abc", "paymentId": "pay_xyz", "signature": "0".repeat(64) });
    let req = TestRequest::post().uri("/orders").set_json(body);
    let (status, body) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("verification failed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn gateway_order_with_valid_signature_is_created() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_insert_order().returning(|new_order| {
            let mut order = sample_order(2, &new_order.owner_id, new_order.payment_status);
            order.gateway_order_id = new_order.gateway_order_id;
            order.gateway_payment_id = new_order.gateway_payment_id;
            Ok(order)
        });
        configure_with(cfg, db);
    };
    let mut body = cod_order_body();
    body["paymentMethod"] = json!("gateway");
    let signature = checkout_signature(TEST_GATEWAY_SECRET, "order_abc", "pay_xyz");
    body["gatewayConfirmation"] = json!({ "orderId": "order_abc", "paymentId": "pay_xyz", "signature": signature });
    let req = TestRequest::post().uri("/orders").set_json(body);
    let (status, body) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["paymentStatus"], "completed");
    assert_eq!(order["gatewayOrderId"], "order_abc");
}

#[actix_web::test]
async fn my_orders_returns_the_callers_history() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_orders_for_user().returning(|owner| {
            Ok(vec![sample_order(2, owner, PaymentStatus::Completed), sample_order(1, owner, PaymentStatus::Processing)])
        });
        configure_with(cfg, db);
    };
    let req = TestRequest::get().uri("/orders");
    let (status, body) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::OK);
    let history: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(history["totalOrders"], 2);
    assert_eq!(history["orders"][0]["id"], 2);
}

#[actix_web::test]
async fn someone_elses_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_for_user().returning(|_, _| Ok(None));
        configure_with(cfg, db);
    };
    let req = TestRequest::get().uri("/orders/42");
    let (status, _) = send_request(req, &issue_token("mallory", false), configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admins_can_fetch_any_order() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id, "alice", PaymentStatus::Processing))));
        configure_with(cfg, db);
    };
    let req = TestRequest::get().uri("/orders/42");
    let (status, body) = send_request(req, &issue_token("root", true), configure).await;
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["ownerId"], "alice");
}

#[actix_web::test]
async fn status_override_requires_admin() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::put().uri("/admin/orders/42/status").set_json(json!({ "status": "cancelled" }));
    let (status, _) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn status_override_applies() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_override_status()
            .returning(|id, status| Ok(StatusOverrideResult::Applied(sample_order(id, "alice", status))));
        configure_with(cfg, db);
    };
    let req = TestRequest::put().uri("/admin/orders/42/status").set_json(json!({ "status": "cancelled" }));
    let (status, body) = send_request(req, &issue_token("root", true), configure).await;
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["paymentStatus"], "cancelled");
}

#[actix_web::test]
async fn status_override_on_a_terminal_order_is_a_409() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| {
        let mut db = MockOrderDb::new();
        db.expect_override_status()
            .returning(|_, _| Ok(StatusOverrideResult::AlreadyTerminal(PaymentStatus::Completed)));
        configure_with(cfg, db);
    };
    let req = TestRequest::put().uri("/admin/orders/42/status").set_json(json!({ "status": "cancelled" }));
    let (status, _) = send_request(req, &issue_token("root", true), configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn checkout_creates_a_gateway_order() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::post().uri("/checkout/gateway").set_json(json!({ "amount": 399.0 }));
    let (status, body) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::OK);
    let checkout: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(checkout["gatewayOrderId"], "order_stub");
    assert_eq!(checkout["amount"], 399.0);
    assert_eq!(checkout["keyId"], "rzp_test_key");
}

#[actix_web::test]
async fn checkout_rejects_non_positive_amounts() {
    let _ = env_logger::try_init().ok();
    let configure = |cfg: &mut ServiceConfig| configure_with(cfg, MockOrderDb::new());
    let req = TestRequest::post().uri("/checkout/gateway").set_json(json!({ "amount": 0.0 }));
    let (status, _) = send_request(req, &issue_token("alice", false), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

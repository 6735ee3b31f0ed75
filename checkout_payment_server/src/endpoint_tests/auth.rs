use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_payment_engine::OrderFlowApi;
use cpg_common::Secret;

use super::{
    helpers::{expired_token, send_request, TEST_GATEWAY_SECRET},
    mocks::MockOrderDb,
};
use crate::routes::my_orders;

fn configure(cfg: &mut ServiceConfig) {
    let api = OrderFlowApi::new(MockOrderDb::new(), Secret::new(TEST_GATEWAY_SECRET.to_string()));
    cfg.app_data(web::Data::new(api)).route("/orders", web::get().to(my_orders::<MockOrderDb>));
}

#[actix_web::test]
async fn no_token_is_a_401() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders"), "", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token"), "unexpected body: {body}");
}

#[actix_web::test]
async fn expired_token_is_a_401() {
    let _ = env_logger::try_init().ok();
    let token = expired_token("alice");
    let (status, _) = send_request(TestRequest::get().uri("/orders"), &token, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn garbage_token_is_a_401() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/orders"), "not.a.jwt", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

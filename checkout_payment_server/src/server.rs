use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_payment_engine::{OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::RemoteGateway,
    routes::{checkout_gateway, create_order, health, my_orders, order_by_id, update_order_status},
    webhook_routes::gateway_webhook,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new(&config.database_url).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), config.gateway.key_secret.clone());
        let gateway = RemoteGateway::new(config.gateway.clone());
        let api_scope = web::scope("/api")
            .route("/orders", web::post().to(create_order::<SqliteDatabase>))
            .route("/orders", web::get().to(my_orders::<SqliteDatabase>))
            .route("/orders/{id}", web::get().to(order_by_id::<SqliteDatabase>))
            .route("/admin/orders/{id}/status", web::put().to(update_order_status::<SqliteDatabase>))
            .route("/checkout/gateway", web::post().to(checkout_gateway::<RemoteGateway>));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cpg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(gateway))
            .app_data(web::Data::new(config.auth.clone()))
            .app_data(web::Data::new(config.gateway.clone()))
            .service(health)
            .service(api_scope)
            .route("/payments/webhook", web::post().to(gateway_webhook::<SqliteDatabase>))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host, port))?
    .run();
    Ok(srv)
}

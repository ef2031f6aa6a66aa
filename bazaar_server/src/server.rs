use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bazaar_engine::{AccessGate, DisputeApi, Hub, SqliteDatabase};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    room_reaper::start_room_reaper,
    routes::{
        health,
        rooms,
        AddDisputeImageRoute,
        CloseDisputeRoute,
        CreateDisputeRoute,
        CreateRoomRoute,
        DisputeForOrderRoute,
        JoinRoomRoute,
        MessageHistoryRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    } else {
        info!("🗃️ Skipping database migrations. BZR_AUTO_MIGRATE is switched off.");
    }
    let hub = Hub::start(config.hub);
    let _reaper = start_room_reaper(hub.clone(), config.room_reaper_interval, config.room_idle_timeout);
    let srv = create_server_instance(config, db, hub)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Builds the HTTP server. The hub is shared by every worker, so all connections to a dispute meet in the same room
/// no matter which worker accepted them.
pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase, hub: Hub) -> Result<Server, ServerError> {
    let hub = web::Data::new(hub);
    let srv = HttpServer::new(move || {
        let dispute_api = DisputeApi::new(db.clone());
        let access_gate = AccessGate::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        // Everything under /api identifies the caller with the `JwtClaims` extractor
        let api_scope = web::scope("/api")
            .service(CreateRoomRoute::<SqliteDatabase>::new())
            .service(JoinRoomRoute::<SqliteDatabase>::new())
            .service(CreateDisputeRoute::<SqliteDatabase>::new())
            .service(DisputeForOrderRoute::<SqliteDatabase>::new())
            .service(CloseDisputeRoute::<SqliteDatabase>::new())
            .service(AddDisputeImageRoute::<SqliteDatabase>::new())
            .service(MessageHistoryRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bzr::access_log"))
            .app_data(web::Data::new(dispute_api))
            .app_data(web::Data::new(access_gate))
            .app_data(web::Data::new(verifier))
            .app_data(hub.clone())
            .service(health)
            .service(rooms)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

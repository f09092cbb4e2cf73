//! Actix Web server bootstrap for the control API.

use crate::ControlPlane;
use crate::config::{DEFAULT_WORKERS, HttpConfig};
use crate::error::{Error, Result};
use crate::http::handlers;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer, middleware,
    web::{self, Data},
};
use std::net::ToSocketAddrs;
use std::sync::Arc;

/// Registers the control API routes.
///
/// Used by [`serve`] and by tests that build an `App` directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/servers", web::get().to(handlers::list_servers))
        .route("/servers/{id}", web::get().to(handlers::get_server))
        .route("/start/{id}", web::post().to(handlers::start_server))
        .route("/stop/{id}", web::post().to(handlers::stop_server));
}

/// Serves the control API until the server is stopped.
///
/// Actix Web stops gracefully on SIGINT/SIGTERM, after which this returns and
/// the caller is expected to call [`ControlPlane::shutdown`].
///
/// # Errors
///
/// Returns `Error::Other` if the address cannot be resolved or bound.
pub async fn serve(plane: Arc<ControlPlane>, config: &HttpConfig) -> Result<()> {
    let addr_str = format!("{}:{}", config.address, config.port);
    let addr = addr_str
        .to_socket_addrs()
        .map_err(|e| Error::Other(format!("Failed to parse socket address: {}", e)))?
        .next()
        .ok_or_else(|| Error::Other(format!("Could not parse socket address: {}", addr_str)))?;

    let plane = Data::from(plane);

    let workers = config.workers.unwrap_or(DEFAULT_WORKERS);
    tracing::info!(address = %addr, workers, "Starting HTTP control API");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(plane.clone())
            .configure(configure)
    })
    .workers(workers)
    .bind(addr)
    .map_err(|e| Error::Other(format!("Failed to bind server: {}", e)))?
    .run()
    .await
    .map_err(|e| Error::Other(format!("HTTP server error: {}", e)))?;

    tracing::info!("HTTP control API stopped");
    Ok(())
}

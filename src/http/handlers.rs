//! HTTP request handlers for the control API.
//!
//! - `GET /servers` lists every server
//! - `GET /servers/{id}` describes one server
//! - `POST /start/{id}` starts a server
//! - `POST /stop/{id}` stops a server
//!
//! Successful calls answer with the server summary as JSON.

use crate::ControlPlane;
use crate::error::Result;
use crate::server::ServerId;

use actix_web::{
    HttpResponse, Responder,
    web::{Data, Path},
};

/// List all servers in discovery order
pub async fn list_servers(plane: Data<ControlPlane>) -> impl Responder {
    HttpResponse::Ok().json(plane.list_servers())
}

/// Describe a single server
pub async fn get_server(plane: Data<ControlPlane>, id: Path<u64>) -> Result<HttpResponse> {
    let summary = plane.server(ServerId::from(id.into_inner()))?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Start a server
pub async fn start_server(plane: Data<ControlPlane>, id: Path<u64>) -> Result<HttpResponse> {
    let id = ServerId::from(id.into_inner());
    tracing::debug!(server_id = %id, "Start requested over HTTP");

    let summary = plane.start_server(id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Stop a server
pub async fn stop_server(plane: Data<ControlPlane>, id: Path<u64>) -> Result<HttpResponse> {
    let id = ServerId::from(id.into_inner());
    tracing::debug!(server_id = %id, "Stop requested over HTTP");

    let summary = plane.stop_server(id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

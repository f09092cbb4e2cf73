//! HTTP control API for Iron Golem using Actix Web.
//!
//! A thin JSON layer over [`ControlPlane`](crate::ControlPlane): it parses
//! the server id from the path, calls the control operation and maps errors
//! to status codes (`404` unknown server, `409` wrong state or conflicting
//! request, `504` launch timeout, `500` anything else).

pub use self::server::{configure, serve};

pub mod error;
pub mod handlers;
pub mod server;

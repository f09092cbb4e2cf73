//! Actix Web error adapters for Iron Golem errors.
//!
//! This module implements `ResponseError` for the library error type so
//! handlers can return `Result` directly.

use crate::error::Error;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code)
            .content_type("application/json")
            .json(json!({
                "error": self.to_string(),
                "code": status_code.as_u16()
            }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::UnknownServer(_) => StatusCode::NOT_FOUND,
            Error::AlreadyRunning(_) => StatusCode::CONFLICT,
            Error::NotRunning(_) => StatusCode::CONFLICT,
            Error::ConflictingOperation(_) => StatusCode::CONFLICT,
            Error::LaunchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerId;

    #[test]
    fn test_status_codes() {
        let id = ServerId::from(1);
        assert_eq!(Error::UnknownServer(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::AlreadyRunning(id).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::NotRunning(id).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::ConflictingOperation(id).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            Error::LaunchTimeout("slow".to_string()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            Error::Launch("no java".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

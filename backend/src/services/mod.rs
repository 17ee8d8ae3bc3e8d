//! HTTP surface. Each submodule exposes a `configure_routes()` scope that
//! `main.rs` mounts on the application.

pub mod fonts;
pub mod generate;
pub mod participants;
pub mod template;
mod upload;

use crate::error::{ServiceError, SessionError};
use actix_web::HttpResponse;
use log::warn;

/// Maps a failed operation onto the response the client sees.
pub(crate) fn error_response(err: &ServiceError) -> HttpResponse {
    warn!("Request failed: {}", err);
    let body = format!("Error: {}", err);
    match err {
        ServiceError::Session(SessionError::NoTemplate | SessionError::NoParticipants) => {
            HttpResponse::Conflict().body(body)
        }
        ServiceError::NotFound(_) => HttpResponse::NotFound().body(body),
        ServiceError::Io(_) | ServiceError::Archive(_) => HttpResponse::ServiceUnavailable().body(body),
        _ => HttpResponse::BadRequest().body(body),
    }
}

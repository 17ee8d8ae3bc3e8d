//! Routes under `/api/fonts`: optional custom faces for certificate text.
//!
//! The regular face draws the serial, course and date; the bold face draws
//! the participant name. A weight without an upload falls back to Times.

mod status;
mod upload;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/fonts";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload/{weight}", post().to(upload::process))
        .route("", delete().to(status::clear))
        .route("/status", get().to(status::process))
}

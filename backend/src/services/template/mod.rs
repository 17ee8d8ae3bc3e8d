//! # Template Service Module
//!
//! Routes under `/api/template` manage the single-page PDF every certificate
//! is drawn on.
//!
//! ## Registered Routes:
//!
//! *   **`POST /upload`**: multipart form with a `file` field. The bytes must
//!     parse as a PDF with at least one page; they then replace the current
//!     template for the rest of the session.
//! *   **`POST /default`**: loads `template.pdf` from the assets directory. When
//!     the file is missing the session keeps whatever it had and `404` is
//!     returned.
//! *   **`GET /status`**: whether a template is loaded, where it came from and
//!     its md5 fingerprint.

mod default;
mod status;
mod upload;

pub(crate) use default::load_default_template;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/template";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/default", post().to(default::process))
        .route("/status", get().to(status::process))
}

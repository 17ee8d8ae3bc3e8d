//! # Participant Service Module
//!
//! Routes under `/api/participants` load a roster, bind its columns to
//! participant fields and expose the resulting canonical set.
//!
//! ## Registered Routes:
//!
//! *   **`POST /upload`**: multipart `file` field, `.csv` or any spreadsheet
//!     format. The rows replace the loaded roster, a column mapping is
//!     proposed and, when it binds name, id and location, applied right away.
//! *   **`POST /mapping`** / **`GET /mapping`**: apply a manual `FieldMapping`
//!     or read back the headers and the mapping in effect.
//! *   **`POST /list`**: the canonical set with serials derived from the posted
//!     settings.
//! *   **`POST /export`**: the same table as a CSV download.
//! *   **`DELETE /`**: forget the roster and every participant.
//! *   **`GET /sample`**: the example roster shipped in the assets directory.
//!
//! Every change to the canonical set is persisted so it survives a restart.

mod list;
mod mapping;
mod reset;
mod upload;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/participants";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/mapping", post().to(mapping::process))
        .route("/mapping", get().to(mapping::current))
        .route("/list", post().to(list::process))
        .route("/export", post().to(list::export))
        .route("", delete().to(reset::process))
        .route("/sample", get().to(reset::sample))
}

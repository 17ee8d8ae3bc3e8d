//! # Certificate Generation Service
//!
//! Routes under `/api/generate` run the batch pipeline as a background job.
//!
//! ## Workflow:
//!
//! 1.  **`POST /start`** resolves the posted settings, snapshots the session's
//!     template, fonts and participants, registers the job as `Pending` and
//!     returns its id. Without a template or participants it answers `409`.
//! 2.  The job composes certificates one at a time under `spawn_blocking`,
//!     writing them straight into a zip archive in the output directory and
//!     reporting `InProgress(percent)` every 50 participants.
//! 3.  **`GET /status/{job_id}`** returns the `JobStatus`; a finished job is
//!     `Completed(archive file name)`.
//! 4.  **`GET /download/{job_id}`** streams the finished archive.
//! 5.  **`POST /cancel/{job_id}`** asks a running job to stop after the
//!     participant it is working on.

mod start;
mod status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/generate";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/download/{job_id}", get().to(status::download))
        .route("/cancel/{job_id}", post().to(status::cancel))
}

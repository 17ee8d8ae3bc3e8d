use crate::config::AppConfig;
use crate::session::SessionState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use std::io::ErrorKind;

const SAMPLE_DOWNLOAD_NAME: &str = "KNCCI_participants_template.csv";

/// Clears the roster, the mapping and the canonical set, and persists the
/// empty set.
pub(crate) async fn process(state: web::Data<SessionState>) -> impl Responder {
    let mut session = state.session.write().await;
    session.reset();
    state.persist(session.participants());
    info!("Participant list reset");
    HttpResponse::Ok().json(session.mapping_state())
}

/// Serves the example roster so users can see the expected columns.
pub(crate) async fn sample(config: web::Data<AppConfig>) -> impl Responder {
    let path = config.sample_roster_path();
    match tokio::fs::read(&path).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(SAMPLE_DOWNLOAD_NAME.to_string())],
            })
            .body(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            HttpResponse::NotFound().body("Error: sample roster not available")
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            HttpResponse::ServiceUnavailable().body(format!("Error: {}", e))
        }
    }
}

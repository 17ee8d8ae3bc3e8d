use crate::error::ServiceError;
use crate::ingest::reader::read_roster;
use crate::services::error_response;
use crate::services::upload::read_file_field;
use crate::session::SessionState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::RosterUploadResponse;

pub(crate) async fn process(state: web::Data<SessionState>, payload: Multipart) -> impl Responder {
    match upload_roster(&state, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

/// Reads the uploaded roster and tries the suggested mapping on it. An
/// incomplete suggestion is reported in the response, not as an error.
async fn upload_roster(state: &SessionState, payload: Multipart) -> Result<RosterUploadResponse, ServiceError> {
    let upload = read_file_field(payload).await?;
    let roster = read_roster(&upload.bytes, &upload.file_name)?;
    let rows = roster.rows.len();
    let headers = roster.headers.clone();

    let mut session = state.session.write().await;
    let (suggested_mapping, normalization) = session.load_roster(roster);
    let message = match &normalization {
        Some(summary) => {
            state.persist(session.participants());
            format!(
                "Loaded {} row(s) from: {}. Participants ready: {} (skipped {}, duplicates removed {}).",
                rows, upload.file_name, summary.participants, summary.skipped, summary.duplicates
            )
        }
        None => format!(
            "Loaded {} row(s) from: {}. Auto-mapping failed; apply a column mapping manually.",
            rows, upload.file_name
        ),
    };

    Ok(RosterUploadResponse {
        file_name: upload.file_name,
        rows,
        headers,
        suggested_mapping,
        normalization,
        message,
    })
}

use crate::certificate::document::CertificateDocument;
use crate::error::ServiceError;
use crate::services::error_response;
use crate::services::upload::read_file_field;
use crate::session::{SessionState, TemplateAsset};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::TemplateStatus;

pub(crate) async fn process(state: web::Data<SessionState>, payload: Multipart) -> impl Responder {
    match upload_template(&state, payload).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response(&e),
    }
}

/// Stores the uploaded PDF as the session template. A file that does not
/// open as a PDF is rejected and the previous template is kept.
async fn upload_template(state: &SessionState, payload: Multipart) -> Result<TemplateStatus, ServiceError> {
    let upload = read_file_field(payload).await?;
    CertificateDocument::load(&upload.bytes)?;

    let mut session = state.session.write().await;
    session.set_template(TemplateAsset::new(upload.bytes, upload.file_name));
    Ok(session.template_status())
}

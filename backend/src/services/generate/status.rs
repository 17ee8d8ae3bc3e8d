use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use crate::services::generate::start::archive_path;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::jobs::JobStatus;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}

/// Sends the archive of a completed job as an attachment.
pub(crate) async fn download(
    req: HttpRequest,
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let archive_name = match state.status(&job_id).await {
        Some(JobStatus::Completed(name)) => name,
        Some(_) => return HttpResponse::Conflict().body("Job has not completed"),
        None => return HttpResponse::NotFound().body("Job ID not found"),
    };

    let path = archive_path(&config.output_dir, &job_id, &archive_name);
    match NamedFile::open_async(&path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(archive_name)],
            })
            .into_response(&req),
        Err(e) => HttpResponse::NotFound().body(format!("Archive not available: {}", e)),
    }
}

pub(crate) async fn cancel(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    if state.request_cancel(&job_id).await {
        HttpResponse::Ok().body("Cancellation requested")
    } else {
        HttpResponse::NotFound().body("No running job with this ID")
    }
}

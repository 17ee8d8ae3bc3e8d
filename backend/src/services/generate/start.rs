//! # Generation Job Start Service
//!
//! `POST /api/generate/start` schedules a certificate batch and returns its
//! job id right away.
//!
//! ## Workflow:
//!
//! 1.  **Snapshot**: the posted `SettingsInput` is resolved into
//!     `RenderSettings` and the session's template, fonts and participants are
//!     copied out, so edits made while the job runs never reach it.
//!
//! 2.  **Job Scheduling**: a job id is registered as `Pending` and a Tokio task
//!     takes over the job's lifecycle.
//!
//! 3.  **Background Processing**: `generate_blocking` runs under
//!     `tokio::task::spawn_blocking`. It composes certificates strictly in
//!     order and streams them into a zip file at
//!     `{output_dir}/{job_id}/{archive name}`.
//!
//! 4.  **Progress Reporting**: the worker sends `GenerateUpdate`s over a per-job
//!     channel. A forwarding task turns them into `JobUpdate`s for the central
//!     job controller. The final status is sent only after every progress
//!     update has been forwarded, so a late `InProgress` can never overwrite it.

use crate::certificate::batch::{archive_file_name, generate, BatchOutcome, BatchRequest, ZipSink};
use crate::config::AppConfig;
use crate::error::{ArchiveError, ServiceError};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::error_response;
use crate::session::{GenerationSnapshot, SessionState};
use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use common::jobs::JobStatus;
use common::requests::{JobCreated, SettingsRequest};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Messages from the blocking worker to the job's forwarding task.
#[derive(Debug)]
pub enum GenerateUpdate {
    Job(JobStatus),
    Progress { done: usize, total: usize },
}

pub(crate) fn archive_path(output_dir: &Path, job_id: &str, archive_name: &str) -> PathBuf {
    output_dir.join(job_id).join(archive_name)
}

pub(crate) async fn process(
    session: web::Data<SessionState>,
    jobs: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    payload: web::Json<SettingsRequest>,
) -> impl Responder {
    match schedule_generate_job(&session, &jobs, &config, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(JobCreated { job_id }),
        Err(e) => error_response(&e),
    }
}

async fn schedule_generate_job(
    session: &SessionState,
    jobs: &JobsState,
    config: &AppConfig,
    req: SettingsRequest,
) -> Result<String, ServiceError> {
    let snapshot = session.session.read().await.snapshot(req.settings.resolve())?;

    let job_id = Uuid::new_v4().to_string();
    let cancel = jobs.register(&job_id).await;
    let archive_name = archive_file_name(&snapshot.settings.zip_name_prefix, Local::now());
    let path = archive_path(&config.output_dir, &job_id, &archive_name);
    info!(
        "Job {}: generating {} certificates into {}",
        job_id,
        snapshot.participants.len(),
        path.display()
    );

    let tx = jobs.tx.clone();
    let job_id_clone = job_id.clone();

    tokio::spawn(async move {
        let (generate_tx, mut generate_rx) = mpsc::channel::<GenerateUpdate>(100);

        let forward_tx = tx.clone();
        let job_id_for_forwarder = job_id_clone.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(update) = generate_rx.recv().await {
                let status = match update {
                    GenerateUpdate::Job(status) => status,
                    GenerateUpdate::Progress { done, total } => JobStatus::InProgress(percent(done, total)),
                };
                let _ = forward_tx
                    .send(JobUpdate {
                        job_id: job_id_for_forwarder.clone(),
                        status,
                    })
                    .await;
            }
        });

        let handle = tokio::task::spawn_blocking(move || generate_blocking(generate_tx, &snapshot, &cancel, &path));
        let result = handle.await;
        // The worker's sender is gone by now; wait until its updates are through.
        let _ = forwarder.await;

        let status = match result {
            Ok(Ok(outcome)) if outcome.cancelled => JobStatus::Cancelled(format!(
                "Cancelled after {} of the participants",
                outcome.generated + outcome.failed
            )),
            Ok(Ok(_)) => JobStatus::Completed(archive_name),
            Ok(Err(e)) => {
                error!("Job {} failed: {}", job_id_clone, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    Ok(job_id)
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        100
    } else {
        (done as f32 / total as f32 * 100.0) as u32
    }
}

/// Runs the batch into a zip file at `path`.
fn generate_blocking(
    tx: mpsc::Sender<GenerateUpdate>,
    snapshot: &GenerationSnapshot,
    cancel: &Arc<AtomicBool>,
    path: &Path,
) -> Result<BatchOutcome, ArchiveError> {
    let _ = tx.blocking_send(GenerateUpdate::Job(JobStatus::InProgress(0)));

    let request = BatchRequest {
        template: &snapshot.template,
        participants: &snapshot.participants,
        settings: &snapshot.settings,
        fonts: &snapshot.fonts,
    };
    write_archive(path, |sink| {
        generate(&request, sink, cancel, |done, total| {
            let _ = tx.blocking_send(GenerateUpdate::Progress { done, total });
        })
    })
}

/// Creates the archive at `path` and lets `fill` write its entries. Only a
/// finished, uncancelled run leaves a file behind.
fn write_archive<F>(path: &Path, fill: F) -> Result<BatchOutcome, ArchiveError>
where
    F: FnOnce(&mut ZipSink<BufWriter<File>>) -> Result<BatchOutcome, ArchiveError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut sink = ZipSink::new(BufWriter::new(File::create(path)?));
    let filled = fill(&mut sink);
    let result = filled.and_then(|outcome| {
        sink.finish()?.flush()?;
        Ok(outcome)
    });

    match result {
        Ok(outcome) if !outcome.cancelled => Ok(outcome),
        other => {
            if let Err(e) = fs::remove_file(path) {
                warn!("Could not remove partial archive {}: {}", path.display(), e);
            }
            other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::batch::ArchiveSink;
    use crate::certificate::document::tests::template_pdf;
    use crate::ingest::reader::read_delimited;
    use crate::job_controller::state::start_job_updater;
    use crate::services::generate::configure_routes;
    use crate::session::{Session, TemplateAsset};
    use actix_web::{test, App};
    use std::io::Cursor;
    use std::time::Duration;

    fn config(output_dir: PathBuf) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            assets_dir: PathBuf::from("assets"),
            output_dir,
            db_path: PathBuf::from("unused.sqlite"),
        }
    }

    #[actix_web::test]
    async fn percent_is_bounded() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(50, 120), 41);
        assert_eq!(percent(120, 120), 100);
    }

    #[actix_web::test]
    async fn failed_run_leaves_no_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = archive_path(dir.path(), "job-1", "Batch.zip");
        let result = write_archive(&path, |sink| {
            sink.add_file("Embu/CBA0000_ANN.pdf", b"%PDF-1.5")?;
            Err(ArchiveError::Io(std::io::Error::other("disk full")))
        });
        assert!(matches!(result, Err(ArchiveError::Io(_))));
        assert!(!path.exists());

        let result = write_archive(&path, |_| {
            Ok(BatchOutcome {
                cancelled: true,
                ..BatchOutcome::default()
            })
        });
        assert!(result.unwrap().cancelled);
        assert!(!path.exists());

        write_archive(&path, |sink| {
            sink.add_file("Embu/CBA0000_ANN.pdf", b"%PDF-1.5")?;
            Ok(BatchOutcome {
                generated: 1,
                ..BatchOutcome::default()
            })
        })
        .unwrap();
        assert!(path.exists());
    }

    #[actix_web::test]
    async fn start_requires_template_and_participants() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionState::new(Session::default(), None)))
                .app_data(web::Data::new(JobsState::new(tx)))
                .app_data(web::Data::new(config(dir.path().to_path_buf())))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate/start")
            .set_json(SettingsRequest::default())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);
    }

    #[actix_web::test]
    async fn job_produces_downloadable_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::default();
        session.set_template(TemplateAsset::new(template_pdf(), "test.pdf"));
        session.load_roster(
            read_delimited(b"Name,ID,County,Course\nAnn,1,Embu,Export\nBob,2,Meru,\n").unwrap(),
        );

        let (tx, rx) = mpsc::channel(100);
        let jobs = JobsState::new(tx);
        tokio::spawn(start_job_updater(jobs.clone(), rx));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionState::new(session, None)))
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(config(dir.path().to_path_buf())))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate/start")
            .set_json(serde_json::json!({ "settings": { "zipNamePrefix": "Batch" } }))
            .to_request();
        let created: JobCreated = test::call_and_read_body_json(&app, req).await;

        let mut status = JobStatus::Pending;
        for _ in 0..200 {
            status = jobs.status(&created.job_id).await.unwrap();
            if status.is_finished() {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(20)).await;
        }
        let name = match &status {
            JobStatus::Completed(name) => name.clone(),
            other => panic!("job did not complete: {other:?}"),
        };
        assert!(name.starts_with("Batch_") && name.ends_with(".zip"), "{name}");

        let req = test::TestRequest::get()
            .uri(&format!("/api/generate/download/{}", created.job_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;

        let mut archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["Embu/CBA0000_ANN.pdf", "Meru/CBA0001_BOB.pdf"]);
        assert!(archive.by_name("Embu/CBA0000_ANN.pdf").is_ok());
    }

    #[actix_web::test]
    async fn archive_prefix_cannot_escape_the_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let mut session = Session::default();
        session.set_template(TemplateAsset::new(template_pdf(), "test.pdf"));
        session.load_roster(read_delimited(b"Name,ID,County\nAnn,1,Embu\n").unwrap());

        let (tx, rx) = mpsc::channel(100);
        let jobs = JobsState::new(tx);
        tokio::spawn(start_job_updater(jobs.clone(), rx));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionState::new(session, None)))
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(config(output_dir.clone())))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate/start")
            .set_json(serde_json::json!({ "settings": { "zipNamePrefix": "../../escaped" } }))
            .to_request();
        let created: JobCreated = test::call_and_read_body_json(&app, req).await;

        let mut status = JobStatus::Pending;
        for _ in 0..200 {
            status = jobs.status(&created.job_id).await.unwrap();
            if status.is_finished() {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(20)).await;
        }
        let name = match &status {
            JobStatus::Completed(name) => name.clone(),
            other => panic!("job did not complete: {other:?}"),
        };
        assert!(name.starts_with("escaped_"), "{name}");
        assert!(output_dir.join(&created.job_id).join(&name).exists());

        let top: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(top, vec!["out"]);
    }

    #[actix_web::test]
    async fn unknown_jobs_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JobsState::new(tx)))
                .app_data(web::Data::new(config(dir.path().to_path_buf())))
                .service(configure_routes()),
        )
        .await;
        for uri in ["/api/generate/status/nope", "/api/generate/download/nope"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 404, "{uri}");
        }
        let req = test::TestRequest::post().uri("/api/generate/cancel/nope").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}

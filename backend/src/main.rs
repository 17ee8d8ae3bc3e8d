mod certificate;
mod config;
mod error;
mod ingest;
mod job_controller;
mod services;
mod session;
mod storage;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use crate::session::{Session, SessionState};
use crate::storage::ParticipantStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let url = format!("http://{}:{}", config.host, config.port);

    // Restore the participant list from the previous run, if any.
    let (store, restored) = match ParticipantStore::open(&config.db_path) {
        Ok(store) => match store.load() {
            Ok(set) => (Some(store), set),
            Err(e) => {
                warn!("Could not restore participants: {}", e);
                (Some(store), Default::default())
            }
        },
        Err(e) => {
            warn!("Participant persistence disabled: {}", e);
            (None, Default::default())
        }
    };
    if !restored.is_empty() {
        info!("Restored participants from storage: {}", restored.len());
    }
    let session_state = SessionState::new(Session::restored(restored), store);

    if let Err(e) = services::template::load_default_template(&session_state, &config).await {
        warn!("{}", e);
    }

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    info!("Server running at {}", url);

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(session_state.clone()))
            .app_data(config.clone())
            .service(services::template::configure_routes())
            .service(services::fonts::configure_routes())
            .service(services::participants::configure_routes())
            .service(services::generate::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}

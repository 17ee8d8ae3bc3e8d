//! Tracks the state of background certificate generation jobs.
//!
//! Generation runs outside the request/response cycle (see
//! `services/generate/start.rs`). Clients get a job id back immediately and
//! poll `GET /api/generate/status/{job_id}` until the job finishes.
//!
//! The main components are:
//! - `JobsState`: clonable, shared state of all jobs. It is injected into the
//!   Actix application in `main.rs`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: the task that applies `JobUpdate`s to `JobsState`.

use common::jobs::JobStatus;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest `JobStatus`.
    ///
    /// Status endpoints take read locks; only `start_job_updater` and job
    /// registration write to it.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Cancellation flags of jobs that have not finished yet. A running job
    /// checks its flag between participants.
    pub cancel_flags: Arc<RwLock<HashMap<String, Arc<AtomicBool>>>>,

    /// Ids of finished jobs, oldest first. Only the most recent
    /// `finished_kept` keep their status; older ones are forgotten.
    pub finished: Arc<RwLock<VecDeque<String>>>,
    pub finished_kept: usize,

    /// Running jobs push `JobUpdate`s through this sender instead of writing
    /// to `jobs` themselves.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// Finished job statuses kept for polling and download.
pub const FINISHED_JOBS_KEPT: usize = 100;

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self::with_retention(tx, FINISHED_JOBS_KEPT)
    }

    pub fn with_retention(tx: mpsc::Sender<JobUpdate>, finished_kept: usize) -> Self {
        JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            cancel_flags: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(RwLock::new(VecDeque::new())),
            finished_kept,
            tx,
        }
    }

    /// Registers a new job as `Pending` and returns its cancellation flag.
    pub async fn register(&self, job_id: &str) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
        self.cancel_flags
            .write()
            .await
            .insert(job_id.to_string(), flag.clone());
        flag
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Asks a running job to stop. Returns `false` for unknown or finished jobs.
    pub async fn request_cancel(&self, job_id: &str) -> bool {
        match self.cancel_flags.read().await.get(job_id) {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

/// Starts the central job state updater task.
///
/// Spawned once from `main.rs`. Every received update overwrites the stored
/// status. Once a job reaches a final status its cancellation flag is dropped,
/// and the oldest finished jobs beyond `finished_kept` are evicted.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let finishing = update.status.is_finished();
        let mut jobs = state.jobs.write().await;
        let was_finished = jobs.get(&update.job_id).is_some_and(JobStatus::is_finished);
        jobs.insert(update.job_id.clone(), update.status);

        if finishing && !was_finished {
            state.cancel_flags.write().await.remove(&update.job_id);
            let mut finished = state.finished.write().await;
            finished.push_back(update.job_id);
            while finished.len() > state.finished_kept {
                if let Some(old) = finished.pop_front() {
                    jobs.remove(&old);
                }
            }
        }
    }
}

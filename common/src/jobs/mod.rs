use serde::{Deserialize, Serialize};

/// Lifecycle of a background certificate generation job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of participants processed so far.
    InProgress(u32),
    /// Carries the file name of the finished archive.
    Completed(String),
    Failed(String),
    Cancelled(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed(_) | JobStatus::Failed(_) | JobStatus::Cancelled(_)
        )
    }
}

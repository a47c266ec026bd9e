//! Background refresh dispatch with an explicit idle/running state.
//!
//! `start` spawns the refresh job on the runtime and returns at once. While a
//! job is in flight further starts are coalesced into it rather than racing it
//! for the output file. The flag is cleared when the task ends, whether the
//! job succeeded, failed or panicked.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use tracing::{error, info};

use crate::error::StoreError;
use crate::outputs::json::ResultStore;

/// The unit of work a refresh runs.
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, Result<(), StoreError>> + Send + Sync>;

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Clears the running flag when the background task finishes or unwinds.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct JobTrigger {
    job: Job,
    store: ResultStore,
    running: Arc<AtomicBool>,
}

impl JobTrigger {
    pub fn new(job: Job, store: ResultStore) -> Self {
        Self {
            job,
            store,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Dispatch the job unless one is already in flight. Never waits for it.
    pub fn start(&self) -> StartOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Refresh already running; not starting another");
            return StartOutcome::AlreadyRunning;
        }

        let guard = RunningGuard(self.running.clone());
        let job = (self.job)();
        tokio::spawn(async move {
            let _guard = guard;
            match job.await {
                Ok(()) => info!("Background refresh finished"),
                Err(e) => error!(error = %e, "Background refresh failed; previous document kept"),
            }
        });
        info!("Background refresh started");
        StartOutcome::Started
    }

    /// `updated_at` of the last persisted run, empty if there is none.
    pub async fn last_completed(&self) -> String {
        self.store.updated_at().await
    }
}

impl std::fmt::Debug for JobTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTrigger")
            .field("store", &self.store)
            .field("running", &self.is_running())
            .finish()
    }
}

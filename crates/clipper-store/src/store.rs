//! The JSON-file job store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, error};

use clipper_models::{Job, JobId};

use crate::error::StoreResult;

/// File-backed job store.
///
/// Every mutation reloads the file, applies the change, and writes the
/// whole map back. The mutex makes each load-mutate-persist cycle atomic
/// with respect to the others; the temp-file rename makes the on-disk
/// write atomic with respect to crashes.
#[derive(Debug)]
pub struct JobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JobStore {
    /// Create a store backed by the given file. The file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full job map. A missing file is an empty store; a corrupt
    /// file is logged loudly and treated as empty rather than wedging
    /// every request.
    async fn load(&self) -> StoreResult<HashMap<JobId, Job>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(jobs) => Ok(jobs),
                Err(e) => {
                    error!(
                        path = %self.path.display(),
                        error = %e,
                        "Jobs file is corrupt, starting with an empty store"
                    );
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the full job map via temp file + rename.
    async fn persist(&self, jobs: &HashMap<JobId, Job>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(jobs)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = jobs.len(), "Persisted jobs");
        Ok(())
    }

    /// Fetch one job by id.
    pub async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let _guard = self.lock.lock().await;
        let jobs = self.load().await?;
        Ok(jobs.get(id).cloned())
    }

    /// Insert or replace a job.
    pub async fn put(&self, job: Job) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load().await?;
        jobs.insert(job.id.clone(), job);
        self.persist(&jobs).await
    }

    /// Apply a mutation to one job and persist the result.
    ///
    /// Returns the updated job, or `None` if no job with that id exists.
    pub async fn update<F>(&self, id: &JobId, f: F) -> StoreResult<Option<Job>>
    where
        F: FnOnce(&mut Job),
    {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load().await?;

        let Some(job) = jobs.get_mut(id) else {
            return Ok(None);
        };
        f(job);
        let updated = job.clone();

        self.persist(&jobs).await?;
        Ok(Some(updated))
    }

    /// List jobs newest-first, bounded by `limit`. Also returns the total
    /// number of jobs in the store.
    pub async fn list(&self, limit: usize) -> StoreResult<(Vec<Job>, usize)> {
        let _guard = self.lock.lock().await;
        let jobs = self.load().await?;
        let total = jobs.len();

        let mut list: Vec<Job> = jobs.into_values().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list.truncate(limit);

        Ok((list, total))
    }
}

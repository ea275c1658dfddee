use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use opp_profiler::CorpusStore;

/// How long a finished job stays queryable.
pub const JOB_RETENTION_HOURS: i64 = 24;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Running {
        started_at: DateTime<Utc>,
    },
    Done {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        profiles: usize,
        gaps: usize,
        output: String,
    },
    Failed {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        error: String,
    },
}

impl JobStatus {
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        match self {
            JobStatus::Running { .. } => None,
            JobStatus::Done { finished_at, .. } | JobStatus::Failed { finished_at, .. } => {
                Some(*finished_at)
            }
        }
    }
}

/// Drop finished jobs older than the retention window. Running jobs stay.
pub fn prune_finished(jobs: &mut HashMap<Uuid, JobStatus>, now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::hours(JOB_RETENTION_HOURS);
    let before = jobs.len();
    jobs.retain(|_, status| status.finished_at().map_or(true, |t| t >= cutoff));
    before - jobs.len()
}

#[derive(Clone)]
pub struct AppState {
    // Read-only corpus; every request builds its own SelectionView over it
    pub store: Arc<CorpusStore>,
    pub jobs: Arc<RwLock<HashMap<Uuid, JobStatus>>>,
}

impl AppState {
    pub fn new(store: CorpusStore) -> Self {
        Self {
            store: Arc::new(store),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a job's status, evicting expired finished jobs first.
    pub async fn record_job(&self, id: Uuid, status: JobStatus) {
        let mut jobs = self.jobs.write().await;
        let evicted = prune_finished(&mut jobs, Utc::now());
        if evicted > 0 {
            debug!("Evicted {} finished jobs", evicted);
        }
        jobs.insert(id, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opp_profiler::core::table::Table;

    fn empty_state() -> AppState {
        AppState::new(CorpusStore::new(Table::default(), Vec::new(), Vec::new()))
    }

    fn done(finished_at: DateTime<Utc>) -> JobStatus {
        JobStatus::Done {
            started_at: finished_at,
            finished_at,
            profiles: 1,
            gaps: 0,
            output: "profiles.bin".to_owned(),
        }
    }

    #[test]
    fn test_prune_drops_only_expired_finished_jobs() {
        let now = Utc::now();
        let old = now - Duration::hours(JOB_RETENTION_HOURS + 1);
        let (running, expired, failed, recent) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut jobs = HashMap::new();
        jobs.insert(running, JobStatus::Running { started_at: old });
        jobs.insert(expired, done(old));
        jobs.insert(
            failed,
            JobStatus::Failed {
                started_at: old,
                finished_at: old,
                error: "boom".to_owned(),
            },
        );
        jobs.insert(recent, done(now));

        assert_eq!(prune_finished(&mut jobs, now), 2);
        assert!(jobs.contains_key(&running));
        assert!(jobs.contains_key(&recent));
        assert!(!jobs.contains_key(&expired));
        assert!(!jobs.contains_key(&failed));
    }

    #[tokio::test]
    async fn test_record_job_evicts_before_insert() {
        let state = empty_state();
        let stale = Uuid::new_v4();
        state
            .jobs
            .write()
            .await
            .insert(stale, done(Utc::now() - Duration::hours(JOB_RETENTION_HOURS + 1)));

        let id = Uuid::new_v4();
        state.record_job(id, JobStatus::Running { started_at: Utc::now() }).await;

        let jobs = state.jobs.read().await;
        assert_eq!(jobs.len(), 1);
        assert!(jobs.contains_key(&id));
    }
}

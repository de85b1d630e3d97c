//! In-memory cache of full job listings, keyed by job id
//!
//! Lives for the whole server session; later searches overwrite entries
//! with the same id.

use std::collections::HashMap;

use crate::jobs::types::FullJobListing;

#[derive(Debug, Default)]
pub struct JobCache {
    jobs: HashMap<i64, FullJobListing>,
}

impl JobCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job: FullJobListing) {
        self.jobs.insert(job.id, job);
    }

    pub fn get(&self, job_id: i64) -> Option<&FullJobListing> {
        self.jobs.get(&job_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

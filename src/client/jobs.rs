// src/client/jobs.rs
use crate::cache::PROFILE_TTL;
use crate::error::ApiError;
use crate::types::records::Job;

use super::ApiClient;

const JOBS_ENDPOINT: &str = "/jobs";

impl ApiClient {
    /// Job details page.
    pub async fn job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.get_cached(
            &format!("job:{}", job_id),
            &format!("{}/{}", JOBS_ENDPOINT, job_id),
            PROFILE_TTL,
        )
        .await
    }
}

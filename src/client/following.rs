// src/client/following.rs
use reqwest::Method;

use crate::error::ApiError;
use crate::types::records::Following;

use super::ApiClient;

const FOLLOWING_ENDPOINT: &str = "/following";
const FOLLOWING_KEY: &str = "following";

impl ApiClient {
    pub async fn following(&self) -> Result<Vec<Following>, ApiError> {
        self.get_cached(FOLLOWING_KEY, FOLLOWING_ENDPOINT, crate::cache::PROFILE_TTL)
            .await
    }

    /// Follow a company or recruiter.
    pub async fn follow(&self, target_id: &str) -> Result<(), ApiError> {
        self.ack(self.request(Method::POST, &format!("{}/{}", FOLLOWING_ENDPOINT, target_id)))
            .await?;
        self.cache().invalidate(FOLLOWING_KEY).await;
        Ok(())
    }

    pub async fn unfollow(&self, target_id: &str) -> Result<(), ApiError> {
        self.ack(self.request(Method::DELETE, &format!("{}/{}", FOLLOWING_ENDPOINT, target_id)))
            .await?;
        self.cache().invalidate(FOLLOWING_KEY).await;
        Ok(())
    }
}

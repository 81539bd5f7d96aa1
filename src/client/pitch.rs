// src/client/pitch.rs
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

use super::profiles::{resume_key, COMPANY_PREFIX, MY_RESUME_KEY, RECRUITER_PREFIX};
use super::{file_part, ApiClient};
use crate::error::ApiError;
use crate::pitch::{PitchApi, SelectedVideo};
use crate::types::pitch::{ElevatorPitch, Subject, SubjectKind};

const PITCH_ENDPOINT: &str = "/elevator-pitch";

impl ApiClient {
    /// Drop every cached profile whose payload embeds the subject's pitch.
    async fn invalidate_pitch_queries(&self, subject: &Subject) {
        let cache = self.cache();
        match subject.kind {
            SubjectKind::Candidate => {
                cache.invalidate(MY_RESUME_KEY).await;
                cache.invalidate(&resume_key(&subject.user_id)).await;
            }
            // Recruiter and company pages are cached by profile id, not owner.
            SubjectKind::Recruiter => cache.invalidate_prefix(RECRUITER_PREFIX).await,
            SubjectKind::Company => cache.invalidate_prefix(COMPANY_PREFIX).await,
        }
    }
}

#[async_trait]
impl PitchApi for ApiClient {
    async fn fetch_pitch(&self, subject: &Subject) -> Result<Option<ElevatorPitch>, ApiError> {
        // Not cached: every call reflects the server's current status.
        let endpoint = format!("{}/user/{}", PITCH_ENDPOINT, subject.user_id);
        match self
            .fetch::<ElevatorPitch>(self.request(Method::GET, &endpoint))
            .await
        {
            Ok(envelope) => envelope.into_optional(),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upload_pitch(
        &self,
        subject: &Subject,
        video: &SelectedVideo,
    ) -> Result<ElevatorPitch, ApiError> {
        let form = Form::new()
            .text("userId", subject.user_id.clone())
            .text("subjectType", subject.kind.as_str())
            .part(
                "video",
                file_part(&video.bytes, &video.file_name, video.content_type)?,
            );

        let pitch: ElevatorPitch = self
            .post_multipart(&format!("{}/upload", PITCH_ENDPOINT), form)
            .await?;
        self.invalidate_pitch_queries(subject).await;
        info!("Uploaded elevator pitch {} for {}", pitch.id, subject);
        Ok(pitch)
    }

    async fn delete_pitch(&self, subject: &Subject) -> Result<(), ApiError> {
        let endpoint = format!("{}/user/{}", PITCH_ENDPOINT, subject.user_id);
        self.ack(self.request(Method::DELETE, &endpoint)).await?;
        self.invalidate_pitch_queries(subject).await;
        info!("Deleted elevator pitch for {}", subject);
        Ok(())
    }
}

// src/pitch/controller.rs
//! Drives one subject's pitch through its lifecycle, performing the I/O

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::media::SelectedVideo;
use super::poller::{wait_until_settled, PollOutcome, PollPolicy};
use super::preview::PreviewRegistry;
use super::state::{transition, PitchEvent, PitchState, PitchView, TransitionError};
use super::PitchApi;
use crate::error::ApiError;
use crate::types::pitch::Subject;

/// What to do with an existing pitch before uploading a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacePolicy {
    /// Fire a delete first and carry on whatever it returns.
    DeleteFirst,
    KeepExisting,
}

/// Answer to the "delete your elevator pitch?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the user (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct PitchController<A: PitchApi> {
    api: Arc<A>,
    subject: Subject,
    previews: PreviewRegistry,
    replace: ReplacePolicy,
    state: PitchState,
    notice: Option<Notice>,
    load_error: Option<String>,
}

impl<A: PitchApi> PitchController<A> {
    pub fn new(api: Arc<A>, subject: Subject) -> Self {
        Self {
            api,
            subject,
            previews: PreviewRegistry::new(),
            replace: ReplacePolicy::DeleteFirst,
            state: PitchState::NoPitch,
            notice: None,
            load_error: None,
        }
    }

    pub fn with_replace_policy(mut self, replace: ReplacePolicy) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_previews(mut self, previews: PreviewRegistry) -> Self {
        self.previews = previews;
        self
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn state(&self) -> &PitchState {
        &self.state
    }

    pub fn view(&self) -> PitchView<'_> {
        PitchView::of(&self.state)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Inline error from the last status fetch, if it failed.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn apply(&mut self, event: PitchEvent) -> Result<(), TransitionError> {
        let current = std::mem::replace(&mut self.state, PitchState::NoPitch);
        let from = current.name();
        let event_name = event.name();
        match transition(current, event) {
            Ok(next) => {
                debug!("{}: {} --{}--> {}", self.subject, from, event_name, next.name());
                self.state = next;
                Ok(())
            }
            Err((restored, err)) => {
                self.state = restored;
                Err(err)
            }
        }
    }

    /// Fetch the current status from the server.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.api.fetch_pitch(&self.subject).await {
            Ok(pitch) => {
                self.load_error = None;
                self.apply(PitchEvent::StatusFetched(pitch))?;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load elevator pitch for {}: {}", self.subject, e);
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Manual "retry" action on the processing card or an error message.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        info!("Refreshing elevator pitch status for {}", self.subject);
        self.load().await
    }

    /// Choose a local video. No network traffic happens here.
    pub fn select_file(&mut self, video: SelectedVideo) -> Result<(), ApiError> {
        let preview = self.previews.create(&video);
        self.apply(PitchEvent::FileSelected { video, preview })?;
        Ok(())
    }

    pub fn clear_file(&mut self) -> Result<(), ApiError> {
        self.apply(PitchEvent::FileCleared)?;
        Ok(())
    }

    /// Upload the selected video, replacing any existing pitch first when the
    /// policy says so.
    pub async fn upload(&mut self) -> Result<(), ApiError> {
        self.apply(PitchEvent::UploadStarted)?;

        let video = match self.state.selected_video() {
            Some(video) => video.clone(),
            None => return Err(ApiError::NoFileSelected),
        };

        if self.replace == ReplacePolicy::DeleteFirst {
            match self.api.delete_pitch(&self.subject).await {
                Ok(()) => {
                    debug!("Removed previous elevator pitch for {}", self.subject);
                    self.apply(PitchEvent::PreviousRemoved)?;
                }
                Err(e) if e.is_not_found() => {
                    debug!("No previous elevator pitch for {}", self.subject);
                    self.apply(PitchEvent::PreviousRemoved)?;
                }
                Err(e) => warn!(
                    "Ignoring failed delete before upload for {}: {}",
                    self.subject, e
                ),
            }
        }

        info!(
            "Uploading elevator pitch {} ({} bytes) for {}",
            video.file_name,
            video.size(),
            self.subject
        );

        match self.api.upload_pitch(&self.subject, &video).await {
            Ok(pitch) => {
                self.apply(PitchEvent::UploadSucceeded(pitch))?;
                self.notice = Some(Notice::info("Elevator pitch uploaded"));
                Ok(())
            }
            Err(e) => {
                warn!("Elevator pitch upload failed for {}: {}", self.subject, e);
                self.apply(PitchEvent::UploadFailed)?;
                self.notice = Some(Notice::error(format!("Upload failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Delete the pitch. Only a `Yes` answer sends a request. Returns whether
    /// the pitch was deleted.
    pub async fn delete(&mut self, confirmation: Confirmation) -> Result<bool, ApiError> {
        if confirmation == Confirmation::No {
            debug!("Delete of elevator pitch for {} cancelled", self.subject);
            return Ok(false);
        }

        self.apply(PitchEvent::DeleteStarted)?;

        match self.api.delete_pitch(&self.subject).await {
            Ok(()) => {
                self.apply(PitchEvent::DeleteSucceeded)?;
                self.notice = Some(Notice::info("Elevator pitch deleted"));
                Ok(true)
            }
            Err(e) => {
                warn!("Elevator pitch delete failed for {}: {}", self.subject, e);
                self.apply(PitchEvent::DeleteFailed)?;
                self.notice = Some(Notice::error(format!("Delete failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Poll until processing finishes and fold the result into the state.
    pub async fn await_processing(&mut self, policy: &PollPolicy) -> Result<PollOutcome, ApiError> {
        match &self.state {
            PitchState::Playable { pitch } => return Ok(PollOutcome::Playable(pitch.clone())),
            PitchState::Processing { .. } => {}
            other => {
                return Err(TransitionError::Unexpected {
                    state: other.name(),
                    event: "AwaitProcessing",
                }
                .into())
            }
        }

        let outcome = wait_until_settled(self.api.as_ref(), &self.subject, policy).await?;

        match &outcome {
            PollOutcome::Playable(pitch) => {
                self.apply(PitchEvent::StatusFetched(Some(pitch.clone())))?;
                self.notice = Some(Notice::info("Elevator pitch is ready"));
            }
            PollOutcome::Removed => {
                self.apply(PitchEvent::StatusFetched(None))?;
                self.notice = Some(Notice::error("Elevator pitch is no longer available"));
            }
            PollOutcome::Exhausted { last, .. } => {
                if let Some(pitch) = last {
                    self.apply(PitchEvent::StatusFetched(Some(pitch.clone())))?;
                }
                self.notice = Some(Notice::info(
                    "Elevator pitch is still processing, try again later",
                ));
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::fake::FakePitchApi;
    use crate::pitch::media::fixtures::sample_video;
    use crate::types::pitch::fixtures::playable_pitch;
    use crate::types::pitch::SubjectKind;
    use std::time::Duration;

    fn controller(api: &Arc<FakePitchApi>) -> PitchController<FakePitchApi> {
        PitchController::new(Arc::clone(api), Subject::new(SubjectKind::Candidate, "u1"))
    }

    #[tokio::test]
    async fn test_upload_without_file_sends_nothing() {
        let api = Arc::new(FakePitchApi::new());
        let mut ctl = controller(&api);

        let err = ctl.upload().await.unwrap_err();
        assert!(matches!(err, ApiError::NoFileSelected));
        assert_eq!(api.upload_count(), 0);
        assert_eq!(api.delete_count(), 0);
        assert_eq!(api.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_upload_keeps_a_single_pitch() {
        let api = Arc::new(FakePitchApi::new());
        let mut ctl = controller(&api);

        for round in 0..5 {
            ctl.select_file(sample_video("pitch.mp4")).unwrap();
            ctl.upload().await.unwrap();
            assert_eq!(api.live_pitches("u1"), 1, "round {}", round);

            if round % 2 == 1 {
                assert!(ctl.delete(Confirmation::Yes).await.unwrap());
                assert_eq!(api.live_pitches("u1"), 0);
            }
        }
        // the first delete found nothing and was ignored
        assert_eq!(api.upload_count(), 5);
    }

    #[tokio::test]
    async fn test_keep_existing_policy_can_duplicate() {
        let api = Arc::new(FakePitchApi::new());
        let mut ctl = controller(&api).with_replace_policy(ReplacePolicy::KeepExisting);

        for _ in 0..2 {
            ctl.select_file(sample_video("pitch.mp4")).unwrap();
            ctl.upload().await.unwrap();
        }
        assert_eq!(api.delete_count(), 0);
        assert_eq!(api.live_pitches("u1"), 2);
    }

    #[tokio::test]
    async fn test_failed_pre_delete_does_not_block_upload() {
        let api = Arc::new(FakePitchApi::new());
        api.fail_next_deletes(1);
        let mut ctl = controller(&api);

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        ctl.upload().await.unwrap();
        assert_eq!(ctl.state().name(), "Processing");
        assert_eq!(api.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_allows_retry_without_reselecting() {
        let api = Arc::new(FakePitchApi::new());
        api.fail_next_uploads(1);
        let previews = PreviewRegistry::new();
        let mut ctl = controller(&api).with_previews(previews.clone());

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        assert!(ctl.upload().await.is_err());
        assert_eq!(ctl.state().name(), "LocalFileSelected");
        assert_eq!(ctl.notice().unwrap().level, NoticeLevel::Error);
        assert_eq!(previews.live_count(), 1);

        ctl.upload().await.unwrap();
        assert_eq!(ctl.state().name(), "Processing");
        assert_eq!(previews.live_count(), 0);
    }

    #[tokio::test]
    async fn test_direct_playable_upload() {
        let api = Arc::new(FakePitchApi::new());
        api.playable_on_upload(true);
        let mut ctl = controller(&api);

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        ctl.upload().await.unwrap();
        assert!(matches!(ctl.view(), PitchView::Player { .. }));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let api = Arc::new(FakePitchApi::new());
        api.seed(playable_pitch("u1"));
        let mut ctl = controller(&api);
        ctl.load().await.unwrap();

        assert!(!ctl.delete(Confirmation::No).await.unwrap());
        assert_eq!(api.delete_count(), 0);
        assert_eq!(ctl.state().name(), "Playable");

        assert!(ctl.delete(Confirmation::Yes).await.unwrap());
        assert_eq!(ctl.view(), PitchView::UploadPrompt);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_playable() {
        let api = Arc::new(FakePitchApi::new());
        api.seed(playable_pitch("u1"));
        api.fail_next_deletes(1);
        let mut ctl = controller(&api);
        ctl.load().await.unwrap();

        assert!(ctl.delete(Confirmation::Yes).await.is_err());
        assert!(matches!(ctl.view(), PitchView::Player { .. }));
        assert_eq!(ctl.take_notice().unwrap().level, NoticeLevel::Error);
        assert!(ctl.notice().is_none());
    }

    #[tokio::test]
    async fn test_load_error_is_inline_and_state_unchanged() {
        let api = Arc::new(FakePitchApi::new());
        api.script_fetch(Err(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        }));
        let mut ctl = controller(&api);

        assert!(ctl.load().await.is_err());
        assert!(ctl.load_error().unwrap().contains("boom"));
        assert_eq!(ctl.state().name(), "NoPitch");

        ctl.refresh().await.unwrap();
        assert!(ctl.load_error().is_none());
    }

    #[tokio::test]
    async fn test_clearing_and_reselecting_does_not_leak_previews() {
        let api = Arc::new(FakePitchApi::new());
        let previews = PreviewRegistry::new();
        let mut ctl = controller(&api).with_previews(previews.clone());

        for _ in 0..10 {
            ctl.select_file(sample_video("pitch.mp4")).unwrap();
        }
        assert_eq!(previews.live_count(), 1);

        ctl.clear_file().unwrap();
        assert_eq!(previews.live_count(), 0);
        assert_eq!(ctl.view(), PitchView::UploadPrompt);

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        drop(ctl);
        assert_eq!(previews.live_count(), 0);
        assert_eq!(previews.created_count(), previews.revoked_count());
    }

    #[tokio::test]
    async fn test_cancelled_replacement_keeps_existing_pitch() {
        let api = Arc::new(FakePitchApi::new());
        api.seed(playable_pitch("u1"));
        let mut ctl = controller(&api);
        ctl.load().await.unwrap();

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        ctl.clear_file().unwrap();
        assert_eq!(api.live_pitches("u1"), 1);
        assert!(matches!(ctl.view(), PitchView::Player { .. }));
    }

    #[tokio::test]
    async fn test_failed_replacement_forgets_removed_pitch() {
        let api = Arc::new(FakePitchApi::new());
        api.seed(playable_pitch("u1"));
        api.fail_next_uploads(1);
        let mut ctl = controller(&api);
        ctl.load().await.unwrap();

        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        assert!(ctl.upload().await.is_err());
        assert_eq!(api.live_pitches("u1"), 0);

        ctl.clear_file().unwrap();
        assert_eq!(ctl.view(), PitchView::UploadPrompt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_processing_reaches_playable() {
        let api = Arc::new(FakePitchApi::new());
        let mut ctl = controller(&api);
        ctl.select_file(sample_video("pitch.mp4")).unwrap();
        ctl.upload().await.unwrap();
        assert!(matches!(ctl.view(), PitchView::ProcessingCard { .. }));

        api.script_fetch(Ok(Some(ctl.state().pitch().unwrap().clone())));
        api.script_fetch(Ok(Some(playable_pitch("u1"))));

        let policy = PollPolicy {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            multiplier: 2,
            max_attempts: 5,
        };
        let outcome = ctl.await_processing(&policy).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Playable(_)));
        assert!(matches!(ctl.view(), PitchView::Player { .. }));
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_await_processing_needs_a_pitch() {
        let api = Arc::new(FakePitchApi::new());
        let mut ctl = controller(&api);
        let err = ctl.await_processing(&PollPolicy::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transition(_)));
    }
}

// src/pitch/mod.rs
//! Elevator pitch upload / processing / playback lifecycle

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::pitch::{ElevatorPitch, Subject};

pub mod controller;
pub mod media;
pub mod poller;
pub mod preview;
pub mod state;

#[cfg(test)]
pub(crate) mod fake;

pub use controller::{Confirmation, Notice, NoticeLevel, PitchController, ReplacePolicy};
pub use media::SelectedVideo;
pub use poller::{PollOutcome, PollPolicy};
pub use preview::{PreviewRegistry, PreviewUrl};
pub use state::{PitchEvent, PitchState, PitchView};

/// Remote operations the lifecycle needs. `ApiClient` is the real one.
#[async_trait]
pub trait PitchApi: Send + Sync {
    /// Fresh status read; `None` when the subject has no pitch.
    async fn fetch_pitch(&self, subject: &Subject) -> Result<Option<ElevatorPitch>, ApiError>;

    async fn upload_pitch(
        &self,
        subject: &Subject,
        video: &SelectedVideo,
    ) -> Result<ElevatorPitch, ApiError>;

    async fn delete_pitch(&self, subject: &Subject) -> Result<(), ApiError>;
}

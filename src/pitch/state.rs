// src/pitch/state.rs
//! Client-side lifecycle of a single subject's elevator pitch

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::media::SelectedVideo;
use super::preview::PreviewUrl;
use crate::types::pitch::{ElevatorPitch, PitchPhase};

#[derive(Debug)]
pub enum PitchState {
    NoPitch,
    /// `previous` is the server pitch the selection would replace; clearing
    /// the selection falls back to it.
    LocalFileSelected {
        video: SelectedVideo,
        preview: PreviewUrl,
        previous: Option<ElevatorPitch>,
    },
    /// The selection is kept so a failed upload can be retried as-is.
    Uploading {
        video: SelectedVideo,
        preview: PreviewUrl,
        previous: Option<ElevatorPitch>,
    },
    Processing {
        pitch: ElevatorPitch,
    },
    Playable {
        pitch: ElevatorPitch,
    },
    Deleting {
        pitch: ElevatorPitch,
    },
}

#[derive(Debug)]
pub enum PitchEvent {
    FileSelected {
        video: SelectedVideo,
        preview: PreviewUrl,
    },
    FileCleared,
    UploadStarted,
    /// The pitch being replaced was removed ahead of the upload.
    PreviousRemoved,
    UploadSucceeded(ElevatorPitch),
    UploadFailed,
    StatusFetched(Option<ElevatorPitch>),
    DeleteStarted,
    DeleteSucceeded,
    DeleteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a request is already in flight ({state})")]
    Busy { state: &'static str },

    #[error("no video file selected")]
    NoFileSelected,

    #[error("there is no elevator pitch to delete")]
    NothingToDelete,

    #[error("event {event} is not valid in state {state}")]
    Unexpected {
        state: &'static str,
        event: &'static str,
    },
}

impl PitchState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoPitch => "NoPitch",
            Self::LocalFileSelected { .. } => "LocalFileSelected",
            Self::Uploading { .. } => "Uploading",
            Self::Processing { .. } => "Processing",
            Self::Playable { .. } => "Playable",
            Self::Deleting { .. } => "Deleting",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading { .. } | Self::Deleting { .. })
    }

    /// The server-side pitch this state knows about, if any.
    pub fn pitch(&self) -> Option<&ElevatorPitch> {
        match self {
            Self::Processing { pitch } | Self::Playable { pitch } | Self::Deleting { pitch } => {
                Some(pitch)
            }
            _ => None,
        }
    }

    pub fn selected_video(&self) -> Option<&SelectedVideo> {
        match self {
            Self::LocalFileSelected { video, .. } | Self::Uploading { video, .. } => Some(video),
            _ => None,
        }
    }

    fn from_pitch(pitch: ElevatorPitch) -> Self {
        match pitch.phase() {
            PitchPhase::Playable => Self::Playable { pitch },
            PitchPhase::Processing => Self::Processing { pitch },
        }
    }

    fn from_status(pitch: Option<ElevatorPitch>) -> Self {
        pitch.map(Self::from_pitch).unwrap_or(Self::NoPitch)
    }
}

impl PitchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileSelected { .. } => "FileSelected",
            Self::FileCleared => "FileCleared",
            Self::UploadStarted => "UploadStarted",
            Self::PreviousRemoved => "PreviousRemoved",
            Self::UploadSucceeded(_) => "UploadSucceeded",
            Self::UploadFailed => "UploadFailed",
            Self::StatusFetched(_) => "StatusFetched",
            Self::DeleteStarted => "DeleteStarted",
            Self::DeleteSucceeded => "DeleteSucceeded",
            Self::DeleteFailed => "DeleteFailed",
        }
    }
}

/// Compute the next state. On error the original state is handed back intact.
pub fn transition(
    state: PitchState,
    event: PitchEvent,
) -> Result<PitchState, (PitchState, TransitionError)> {
    use PitchEvent as E;
    use PitchState as S;

    match (state, event) {
        // Stale fetches that land mid-request never clobber the request's outcome.
        (s @ (S::Uploading { .. } | S::Deleting { .. }), E::StatusFetched(_)) => Ok(s),
        (s @ (S::Uploading { .. } | S::Deleting { .. }), e @ (E::FileSelected { .. }
            | E::FileCleared
            | E::UploadStarted
            | E::DeleteStarted)) => {
            let err = TransitionError::Busy { state: s.name() };
            drop(e);
            Err((s, err))
        }

        (s, E::FileSelected { video, preview }) => {
            let previous = match s {
                S::LocalFileSelected { previous, .. } => previous,
                S::Processing { pitch } | S::Playable { pitch } => Some(pitch),
                _ => None,
            };
            Ok(S::LocalFileSelected {
                video,
                preview,
                previous,
            })
        }

        (S::LocalFileSelected { previous, .. }, E::FileCleared) => Ok(S::from_status(previous)),
        (S::NoPitch, E::FileCleared) => Ok(S::NoPitch),

        (
            S::LocalFileSelected {
                video,
                preview,
                previous,
            },
            E::UploadStarted,
        ) => Ok(S::Uploading {
            video,
            preview,
            previous,
        }),
        (s, E::UploadStarted) => Err((s, TransitionError::NoFileSelected)),

        (S::Uploading { video, preview, .. }, E::PreviousRemoved) => Ok(S::Uploading {
            video,
            preview,
            previous: None,
        }),
        (S::Uploading { .. }, E::UploadSucceeded(pitch)) => Ok(S::from_pitch(pitch)),
        (
            S::Uploading {
                video,
                preview,
                previous,
            },
            E::UploadFailed,
        ) => Ok(S::LocalFileSelected {
            video,
            preview,
            previous,
        }),

        // A pending local selection wins over whatever the server reports;
        // the report only refreshes the pitch it would fall back to.
        (S::LocalFileSelected { video, preview, .. }, E::StatusFetched(previous)) => {
            Ok(S::LocalFileSelected {
                video,
                preview,
                previous,
            })
        }
        (S::NoPitch | S::Processing { .. } | S::Playable { .. }, E::StatusFetched(pitch)) => {
            Ok(S::from_status(pitch))
        }

        (S::Processing { pitch } | S::Playable { pitch }, E::DeleteStarted) => {
            Ok(S::Deleting { pitch })
        }
        (s @ (S::NoPitch | S::LocalFileSelected { .. }), E::DeleteStarted) => {
            Err((s, TransitionError::NothingToDelete))
        }

        (S::Deleting { .. }, E::DeleteSucceeded) => Ok(S::NoPitch),
        (S::Deleting { pitch }, E::DeleteFailed) => Ok(S::from_pitch(pitch)),

        (s, e) => {
            let err = TransitionError::Unexpected {
                state: s.name(),
                event: e.name(),
            };
            Err((s, err))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyAction {
    Uploading,
    Deleting,
}

/// What a front end should show for the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum PitchView<'a> {
    UploadPrompt,
    Preview {
        url: &'a str,
        file_name: &'a str,
    },
    Busy {
        action: BusyAction,
    },
    ProcessingCard {
        started_at: Option<DateTime<Utc>>,
    },
    Player {
        pitch_id: &'a str,
        hls_url: &'a str,
    },
}

impl<'a> PitchView<'a> {
    pub fn of(state: &'a PitchState) -> Self {
        match state {
            PitchState::NoPitch => Self::UploadPrompt,
            PitchState::LocalFileSelected { preview, .. } => Self::Preview {
                url: preview.url(),
                file_name: preview.file_name(),
            },
            PitchState::Uploading { .. } => Self::Busy {
                action: BusyAction::Uploading,
            },
            PitchState::Deleting { .. } => Self::Busy {
                action: BusyAction::Deleting,
            },
            PitchState::Processing { pitch } => Self::ProcessingCard {
                started_at: pitch.processing_started_at(),
            },
            PitchState::Playable { pitch } => match pitch.hls_url() {
                Some(hls_url) if !pitch.is_processing() => Self::Player {
                    pitch_id: &pitch.id,
                    hls_url,
                },
                _ => Self::ProcessingCard {
                    started_at: pitch.processing_started_at(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::media::fixtures::sample_video;
    use crate::pitch::preview::PreviewRegistry;
    use crate::types::pitch::fixtures::{playable_pitch, processing_pitch};

    fn select(registry: &PreviewRegistry) -> PitchEvent {
        let video = sample_video("pitch.mp4");
        let preview = registry.create(&video);
        PitchEvent::FileSelected { video, preview }
    }

    fn step(state: PitchState, event: PitchEvent) -> PitchState {
        transition(state, event).map_err(|(_, e)| e).unwrap()
    }

    #[test]
    fn test_happy_path_to_playable() {
        let registry = PreviewRegistry::new();
        let state = step(PitchState::NoPitch, select(&registry));
        assert_eq!(state.name(), "LocalFileSelected");

        let state = step(state, PitchEvent::UploadStarted);
        assert!(state.is_busy());

        let state = step(state, PitchEvent::UploadSucceeded(processing_pitch("u1")));
        assert_eq!(state.name(), "Processing");
        assert_eq!(registry.live_count(), 0);

        let state = step(state, PitchEvent::StatusFetched(Some(playable_pitch("u1"))));
        assert_eq!(state.name(), "Playable");
    }

    #[test]
    fn test_upload_failure_keeps_selection() {
        let registry = PreviewRegistry::new();
        let state = step(PitchState::NoPitch, select(&registry));
        let state = step(state, PitchEvent::UploadStarted);
        let state = step(state, PitchEvent::UploadFailed);

        assert_eq!(state.name(), "LocalFileSelected");
        assert_eq!(state.selected_video().unwrap().file_name, "pitch.mp4");
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_upload_without_file_is_rejected() {
        let (state, err) = transition(PitchState::NoPitch, PitchEvent::UploadStarted).unwrap_err();
        assert_eq!(err, TransitionError::NoFileSelected);
        assert_eq!(state.name(), "NoPitch");
    }

    #[test]
    fn test_busy_rejects_and_preserves_state() {
        let registry = PreviewRegistry::new();
        let state = step(PitchState::NoPitch, select(&registry));
        let state = step(state, PitchEvent::UploadStarted);

        let (state, err) = transition(state, select(&registry)).unwrap_err();
        assert_eq!(err, TransitionError::Busy { state: "Uploading" });
        assert_eq!(state.name(), "Uploading");
        // the rejected selection's preview was released, the in-flight one kept
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_delete_failure_restores_previous_state() {
        let state = PitchState::Playable {
            pitch: playable_pitch("u1"),
        };
        let state = step(state, PitchEvent::DeleteStarted);
        assert_eq!(state.name(), "Deleting");
        let state = step(state, PitchEvent::DeleteFailed);
        assert_eq!(state.name(), "Playable");

        let state = step(state, PitchEvent::DeleteStarted);
        let state = step(state, PitchEvent::DeleteSucceeded);
        assert_eq!(PitchView::of(&state), PitchView::UploadPrompt);
    }

    #[test]
    fn test_clearing_selection_restores_known_pitch() {
        let registry = PreviewRegistry::new();
        let state = PitchState::Playable {
            pitch: playable_pitch("u1"),
        };
        let state = step(state, select(&registry));
        assert_eq!(state.name(), "LocalFileSelected");

        // a second pick keeps the pitch it would replace
        let state = step(state, select(&registry));
        let state = step(state, PitchEvent::FileCleared);
        assert_eq!(state.name(), "Playable");
        assert!(matches!(PitchView::of(&state), PitchView::Player { .. }));
        assert_eq!(registry.live_count(), 0);

        let state = step(
            PitchState::Processing {
                pitch: processing_pitch("u1"),
            },
            select(&registry),
        );
        let state = step(state, PitchEvent::FileCleared);
        assert_eq!(state.name(), "Processing");
    }

    #[test]
    fn test_failed_replacement_after_removal_falls_back_to_prompt() {
        let registry = PreviewRegistry::new();
        let state = PitchState::Playable {
            pitch: playable_pitch("u1"),
        };
        let state = step(state, select(&registry));
        let state = step(state, PitchEvent::UploadStarted);
        let state = step(state, PitchEvent::PreviousRemoved);
        let state = step(state, PitchEvent::UploadFailed);
        let state = step(state, PitchEvent::FileCleared);
        assert_eq!(PitchView::of(&state), PitchView::UploadPrompt);
    }

    #[test]
    fn test_nothing_to_delete() {
        let (_, err) = transition(PitchState::NoPitch, PitchEvent::DeleteStarted).unwrap_err();
        assert_eq!(err, TransitionError::NothingToDelete);
    }

    #[test]
    fn test_status_does_not_override_local_selection() {
        let registry = PreviewRegistry::new();
        let state = step(PitchState::NoPitch, select(&registry));
        let state = step(state, PitchEvent::StatusFetched(Some(playable_pitch("u1"))));
        assert_eq!(state.name(), "LocalFileSelected");

        let state = step(state, PitchEvent::FileCleared);
        assert_eq!(state.name(), "Playable");
    }

    #[test]
    fn test_status_gone_resets_to_no_pitch() {
        let state = PitchState::Processing {
            pitch: processing_pitch("u1"),
        };
        let state = step(state, PitchEvent::StatusFetched(None));
        assert_eq!(state.name(), "NoPitch");
    }

    #[test]
    fn test_processing_pitch_never_renders_player() {
        let state = PitchState::Processing {
            pitch: processing_pitch("u1"),
        };
        assert!(matches!(
            PitchView::of(&state),
            PitchView::ProcessingCard { started_at: Some(_) }
        ));

        // even if a pitch with a url but an active processing flag is forced in
        let mut pitch = playable_pitch("u1");
        pitch.processing = processing_pitch("u1").processing;
        let state = PitchState::Playable { pitch };
        assert!(matches!(
            PitchView::of(&state),
            PitchView::ProcessingCard { .. }
        ));
    }

    #[test]
    fn test_playable_pitch_renders_player() {
        let state = step(
            PitchState::NoPitch,
            PitchEvent::StatusFetched(Some(playable_pitch("u1"))),
        );
        match PitchView::of(&state) {
            PitchView::Player { pitch_id, hls_url } => {
                assert_eq!(pitch_id, "pitch-u1");
                assert!(hls_url.ends_with(".m3u8"));
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }
}

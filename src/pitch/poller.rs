// src/pitch/poller.rs
//! Waits for server-side transcoding to finish with bounded, backed-off polling

use std::time::Duration;
use tracing::{debug, info, warn};

use super::PitchApi;
use crate::error::ApiError;
use crate::types::pitch::{ElevatorPitch, PitchPhase, Subject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
            max_attempts: 10,
        }
    }
}

impl PollPolicy {
    /// Delay after the given zero-based attempt: `initial * multiplier^attempt`, capped.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(self.multiplier.max(1).saturating_pow(attempt))
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Playable(ElevatorPitch),
    /// The pitch disappeared (deleted elsewhere or rejected by the pipeline).
    Removed,
    Exhausted {
        attempts: u32,
        last: Option<ElevatorPitch>,
    },
}

/// Poll until the pitch is playable, gone, or the attempt budget runs out.
///
/// Transport errors and 5xx responses use up an attempt; any other error ends
/// polling immediately.
pub async fn wait_until_settled<A>(
    api: &A,
    subject: &Subject,
    policy: &PollPolicy,
) -> Result<PollOutcome, ApiError>
where
    A: PitchApi + ?Sized,
{
    let mut last = None;

    for attempt in 0..policy.max_attempts {
        match api.fetch_pitch(subject).await {
            Ok(Some(pitch)) if pitch.phase() == PitchPhase::Playable => {
                info!("Elevator pitch for {} is playable after {} checks", subject, attempt + 1);
                return Ok(PollOutcome::Playable(pitch));
            }
            Ok(Some(pitch)) => {
                debug!(
                    "Elevator pitch for {} still processing (check {}/{})",
                    subject,
                    attempt + 1,
                    policy.max_attempts
                );
                last = Some(pitch);
            }
            Ok(None) => {
                info!("Elevator pitch for {} no longer exists", subject);
                return Ok(PollOutcome::Removed);
            }
            Err(e) if e.is_transient() => {
                warn!("Status check {} for {} failed: {}", attempt + 1, subject, e);
            }
            Err(e) => return Err(e),
        }

        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    warn!(
        "Gave up waiting for elevator pitch of {} after {} checks",
        subject, policy.max_attempts
    );
    Ok(PollOutcome::Exhausted {
        attempts: policy.max_attempts,
        last,
    })
}

// src/types/pitch.rs
//! Elevator pitch records as returned by `/elevator-pitch/*`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a pitch belongs to. Each subject owns at most one live pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Candidate,
    Recruiter,
    Company,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Recruiter => "recruiter",
            Self::Company => "company",
        }
    }
}

impl std::str::FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "candidate" | "resume" => Ok(Self::Candidate),
            "recruiter" => Ok(Self::Recruiter),
            "company" => Ok(Self::Company),
            other => Err(format!("unknown subject kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    pub kind: SubjectKind,
    pub user_id: String,
}

impl Subject {
    pub fn new(kind: SubjectKind, user_id: impl Into<String>) -> Self {
        Self {
            kind,
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorPitch {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub video: Option<PitchVideo>,
    #[serde(default)]
    pub processing: Option<PitchProcessing>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchVideo {
    #[serde(default)]
    pub hls_url: Option<String>,
    #[serde(default)]
    pub encryption_key_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchProcessing {
    #[serde(default)]
    pub state: Option<ProcessingState>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// Server-side transcoding marker. Anything other than `"processing"` means
/// the server is no longer working on the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Processing,
    #[serde(other)]
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchPhase {
    Processing,
    Playable,
}

impl ElevatorPitch {
    pub fn is_processing(&self) -> bool {
        matches!(
            self.processing.as_ref().and_then(|p| p.state),
            Some(ProcessingState::Processing)
        )
    }

    pub fn hls_url(&self) -> Option<&str> {
        self.video
            .as_ref()
            .and_then(|v| v.hls_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn processing_started_at(&self) -> Option<DateTime<Utc>> {
        self.processing.as_ref().and_then(|p| p.started_at)
    }

    pub fn phase(&self) -> PitchPhase {
        if self.hls_url().is_some() && !self.is_processing() {
            PitchPhase::Playable
        } else {
            PitchPhase::Processing
        }
    }
}

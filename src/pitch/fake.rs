// src/pitch/fake.rs
//! In-memory stand-in for the pitch endpoints. It deliberately allows several
//! records per subject so tests can catch a client that creates duplicates.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{PitchApi, SelectedVideo};
use crate::error::ApiError;
use crate::types::pitch::{ElevatorPitch, PitchProcessing, PitchVideo, ProcessingState, Subject};

#[derive(Default)]
struct Inner {
    scripted: VecDeque<Result<Option<ElevatorPitch>, ApiError>>,
    records: HashMap<String, Vec<ElevatorPitch>>,
    fetches: usize,
    uploads: usize,
    deletes: usize,
    failing_uploads: usize,
    failing_deletes: usize,
    playable_on_upload: bool,
    next_id: u64,
}

#[derive(Default)]
pub(crate) struct FakePitchApi {
    inner: Mutex<Inner>,
}

impl FakePitchApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_fetch(&self, response: Result<Option<ElevatorPitch>, ApiError>) {
        self.inner.lock().unwrap().scripted.push_back(response);
    }

    pub fn fail_next_uploads(&self, n: usize) {
        self.inner.lock().unwrap().failing_uploads = n;
    }

    pub fn fail_next_deletes(&self, n: usize) {
        self.inner.lock().unwrap().failing_deletes = n;
    }

    pub fn playable_on_upload(&self, playable: bool) {
        self.inner.lock().unwrap().playable_on_upload = playable;
    }

    pub fn seed(&self, pitch: ElevatorPitch) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .records
            .entry(pitch.user_id.clone())
            .or_default()
            .push(pitch);
    }

    pub fn live_pitches(&self, user_id: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .records
            .get(user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().unwrap().fetches
    }

    pub fn upload_count(&self) -> usize {
        self.inner.lock().unwrap().uploads
    }

    pub fn delete_count(&self) -> usize {
        self.inner.lock().unwrap().deletes
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "internal error".to_string(),
    }
}

#[async_trait]
impl PitchApi for FakePitchApi {
    async fn fetch_pitch(&self, subject: &Subject) -> Result<Option<ElevatorPitch>, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetches += 1;
        if let Some(response) = inner.scripted.pop_front() {
            return response;
        }
        Ok(inner
            .records
            .get(&subject.user_id)
            .and_then(|records| records.last())
            .cloned())
    }

    async fn upload_pitch(
        &self,
        subject: &Subject,
        video: &SelectedVideo,
    ) -> Result<ElevatorPitch, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.uploads += 1;
        if inner.failing_uploads > 0 {
            inner.failing_uploads -= 1;
            return Err(server_error());
        }

        inner.next_id += 1;
        let id = format!("pitch-{}", inner.next_id);
        let pitch = if inner.playable_on_upload {
            ElevatorPitch {
                id: id.clone(),
                user_id: subject.user_id.clone(),
                video: Some(PitchVideo {
                    hls_url: Some(format!("https://cdn.example.com/{}/{}.m3u8", id, video.file_name)),
                    encryption_key_url: None,
                }),
                processing: None,
                created_at: Some(Utc::now()),
                updated_at: None,
            }
        } else {
            ElevatorPitch {
                id,
                user_id: subject.user_id.clone(),
                video: None,
                processing: Some(PitchProcessing {
                    state: Some(ProcessingState::Processing),
                    started_at: Some(Utc::now()),
                }),
                created_at: Some(Utc::now()),
                updated_at: None,
            }
        };

        inner
            .records
            .entry(subject.user_id.clone())
            .or_default()
            .push(pitch.clone());
        Ok(pitch)
    }

    async fn delete_pitch(&self, subject: &Subject) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.deletes += 1;
        if inner.failing_deletes > 0 {
            inner.failing_deletes -= 1;
            return Err(server_error());
        }
        match inner.records.remove(&subject.user_id) {
            Some(records) if !records.is_empty() => Ok(()),
            _ => Err(ApiError::NotFound("elevator pitch".to_string())),
        }
    }
}

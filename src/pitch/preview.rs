// src/pitch/preview.rs
//! Temporary `blob:` references for locally selected videos.
//!
//! A `PreviewUrl` is revoked when it is dropped, so replacing or clearing a
//! selection (or dropping the state that owns it) releases it exactly once.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;
use uuid::Uuid;

use super::media::SelectedVideo;

#[derive(Debug, Default)]
struct Ledger {
    live: HashSet<Uuid>,
    created: u64,
    revoked: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    ledger: Arc<Mutex<Ledger>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, video: &SelectedVideo) -> PreviewUrl {
        let id = Uuid::new_v4();
        {
            let mut ledger = lock(&self.ledger);
            ledger.live.insert(id);
            ledger.created += 1;
        }
        trace!("Created preview {} for {}", id, video.file_name);
        PreviewUrl {
            id,
            url: format!("blob:{}", id),
            file_name: video.file_name.clone(),
            ledger: Arc::clone(&self.ledger),
        }
    }

    pub fn live_count(&self) -> usize {
        lock(&self.ledger).live.len()
    }

    pub fn created_count(&self) -> u64 {
        lock(&self.ledger).created
    }

    pub fn revoked_count(&self) -> u64 {
        lock(&self.ledger).revoked
    }

    pub fn is_live(&self, preview: &PreviewUrl) -> bool {
        lock(&self.ledger).live.contains(&preview.id)
    }
}

fn lock(ledger: &Mutex<Ledger>) -> MutexGuard<'_, Ledger> {
    ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct PreviewUrl {
    id: Uuid,
    url: String,
    file_name: String,
    ledger: Arc<Mutex<Ledger>>,
}

impl PreviewUrl {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        let mut ledger = lock(&self.ledger);
        if ledger.live.remove(&self.id) {
            ledger.revoked += 1;
            trace!("Revoked preview {}", self.id);
        }
    }
}

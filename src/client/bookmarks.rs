// src/client/bookmarks.rs
use reqwest::Method;
use tracing::info;

use crate::cache::PROFILE_TTL;
use crate::error::ApiError;
use crate::types::records::Bookmark;

use super::ApiClient;

const BOOKMARKS_ENDPOINT: &str = "/bookmarks";
const BOOKMARKS_KEY: &str = "bookmarks";

impl ApiClient {
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
        self.get_cached(BOOKMARKS_KEY, BOOKMARKS_ENDPOINT, PROFILE_TTL)
            .await
    }

    pub async fn add_bookmark(&self, job_id: &str) -> Result<(), ApiError> {
        self.ack(self.request(Method::POST, &format!("{}/{}", BOOKMARKS_ENDPOINT, job_id)))
            .await?;
        self.cache().invalidate(BOOKMARKS_KEY).await;
        info!("Bookmarked job {}", job_id);
        Ok(())
    }

    pub async fn remove_bookmark(&self, job_id: &str) -> Result<(), ApiError> {
        self.ack(self.request(Method::DELETE, &format!("{}/{}", BOOKMARKS_ENDPOINT, job_id)))
            .await?;
        self.cache().invalidate(BOOKMARKS_KEY).await;
        info!("Removed bookmark for job {}", job_id);
        Ok(())
    }
}

/// Write bookmarks as CSV (job id, title, company, location).
pub fn write_bookmarks_csv<W: std::io::Write>(
    bookmarks: &[Bookmark],
    writer: W,
) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["job_id", "title", "company", "location", "bookmarked_at"])?;
    for bookmark in bookmarks {
        let job = &bookmark.job;
        let bookmarked_at = bookmark
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        csv.write_record([
            job.id.as_str(),
            job.title.as_str(),
            job.company.as_ref().map(|c| c.name.as_str()).unwrap_or(""),
            job.location.as_deref().unwrap_or(""),
            bookmarked_at.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

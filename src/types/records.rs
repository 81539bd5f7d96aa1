// src/types/records.rs
//! Flat records manipulated through plain REST CRUD

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::pitch::ElevatorPitch;

// ===== Jobs & bookmarks =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company: Option<CompanySummary>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub salary_range: Option<SalaryRange>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: Job,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ===== Resume =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub honors: Vec<Honor>,
    #[serde(default)]
    pub elevator_pitch: Option<ElevatorPitch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_studying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub designation: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_working: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Honor {
    pub title: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

// ===== Company & recruiter =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub elevator_pitch: Option<ElevatorPitch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recruiter {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub company: Option<CompanySummary>,
    #[serde(default)]
    pub elevator_pitch: Option<ElevatorPitch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Following {
    #[serde(rename = "_id")]
    pub id: String,
    pub following_id: String,
    #[serde(default)]
    pub following_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ===== Lookups =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub name: String,
}

/// Shape shared by categories, skills, languages and universities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

pub type JobCategory = NamedItem;
pub type Skill = NamedItem;
pub type Language = NamedItem;
pub type University = NamedItem;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_defaults_missing_sections() {
        let raw = r#"{"_id":"r1","userId":"u1","firstName":"Ada","lastName":"Lovelace"}"#;
        let resume: Resume = serde_json::from_str(raw).unwrap();
        assert!(resume.educations.is_empty());
        assert!(resume.elevator_pitch.is_none());
    }

    #[test]
    fn test_bookmark_embeds_job() {
        let raw = r#"{"_id":"b1","job":{"_id":"j1","title":"Rust Engineer","skills":["rust"]}}"#;
        let bookmark: Bookmark = serde_json::from_str(raw).unwrap();
        assert_eq!(bookmark.job.title, "Rust Engineer");
        assert_eq!(bookmark.job.skills, vec!["rust".to_string()]);
    }
}

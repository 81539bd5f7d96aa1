// src/validation.rs
//! Form-level validation run before any submission reaches the network

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::types::records::{Education, Experience, Honor};

/// About / description fields allow this many words, inclusive.
pub const MAX_ABOUT_WORDS: usize = 200;
pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(field, format!("must be at most {} characters (got {})", max, len));
        }
    }

    pub fn max_words(&mut self, field: &str, value: &str, max: usize) {
        let words = word_count(value);
        if words > max {
            self.add(field, format!("must be at most {} words (got {})", max, words));
        }
    }

    pub fn date_order(
        &mut self,
        field: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        ongoing: bool,
    ) {
        match (end, ongoing) {
            (Some(_), true) => self.add(field, "an ongoing entry cannot have an end date"),
            (Some(end), false) if end < start => {
                self.add(field, "end date must not be before start date")
            }
            (None, false) => self.add(field, "end date is required unless ongoing"),
            _ => {}
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Count whitespace separated words. Blank text has zero words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Load a form from a TOML file
pub fn load_form<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse form file: {}", path.display()))
}

// ===== Forms =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
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
}

impl Validate for ResumeForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("firstName", &self.first_name);
        errors.max_chars("firstName", &self.first_name, MAX_NAME_CHARS);
        errors.require("lastName", &self.last_name);
        errors.max_chars("lastName", &self.last_name, MAX_NAME_CHARS);

        if let Some(title) = &self.title {
            errors.max_chars("title", title, MAX_TITLE_CHARS);
        }
        if let Some(about) = &self.about {
            errors.max_words("about", about, MAX_ABOUT_WORDS);
        }

        for (i, edu) in self.educations.iter().enumerate() {
            let field = format!("educations[{}]", i);
            errors.require(&format!("{}.institution", field), &edu.institution);
            errors.require(&format!("{}.degree", field), &edu.degree);
            errors.date_order(
                &format!("{}.endDate", field),
                edu.start_date,
                edu.end_date,
                edu.currently_studying,
            );
        }

        for (i, exp) in self.experiences.iter().enumerate() {
            let field = format!("experiences[{}]", i);
            errors.require(&format!("{}.company", field), &exp.company);
            errors.require(&format!("{}.designation", field), &exp.designation);
            if let Some(description) = &exp.description {
                errors.max_words(&format!("{}.description", field), description, MAX_ABOUT_WORDS);
            }
            errors.date_order(
                &format!("{}.endDate", field),
                exp.start_date,
                exp.end_date,
                exp.currently_working,
            );
        }

        for (i, honor) in self.honors.iter().enumerate() {
            let field = format!("honors[{}].title", i);
            errors.require(&field, &honor.title);
            errors.max_chars(&field, &honor.title, MAX_TITLE_CHARS);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
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
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl Validate for CompanyForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name);
        errors.max_chars("name", &self.name, MAX_TITLE_CHARS);

        if let Some(description) = &self.description {
            errors.max_words("description", description, MAX_ABOUT_WORDS);
        }
        if let Some(website) = &self.website {
            if !website.starts_with("http://") && !website.starts_with("https://") {
                errors.add("website", "must start with http:// or https://");
            }
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

impl Validate for RecruiterForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("firstName", &self.first_name);
        errors.max_chars("firstName", &self.first_name, MAX_NAME_CHARS);
        errors.require("lastName", &self.last_name);
        errors.max_chars("lastName", &self.last_name, MAX_NAME_CHARS);

        if let Some(designation) = &self.designation {
            errors.max_chars("designation", designation, MAX_TITLE_CHARS);
        }
        if let Some(about) = &self.about {
            errors.max_words("about", about, MAX_ABOUT_WORDS);
        }

        errors.into_result()
    }
}

// src/client/lookups.rs
//! Reference data used to fill form pickers. Cached for an hour.

use reqwest::Method;
use std::fmt;

use super::ApiClient;
use crate::cache::LOOKUP_TTL;
use crate::error::ApiError;
use crate::types::records::{City, Country, NamedItem};

const COUNTRIES_ENDPOINT: &str = "/countries";
const CITIES_ENDPOINT: &str = "/countries/cities";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    JobCategories,
    Skills,
    Languages,
    Universities,
}

impl LookupKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::JobCategories => "/category/job-category",
            Self::Skills => "/skill",
            Self::Languages => "/language",
            Self::Universities => "/university",
        }
    }

    fn cache_key(&self) -> String {
        format!("lookup:{}", self)
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::JobCategories => "job-categories",
            Self::Skills => "skills",
            Self::Languages => "languages",
            Self::Universities => "universities",
        };
        write!(f, "{}", name)
    }
}

impl ApiClient {
    pub async fn countries(&self) -> Result<Vec<Country>, ApiError> {
        self.get_cached("lookup:countries", COUNTRIES_ENDPOINT, LOOKUP_TTL)
            .await
    }

    pub async fn cities(&self, country: &str) -> Result<Vec<City>, ApiError> {
        let key = format!("lookup:cities:{}", country);
        if let Some(hit) = self.cache().get(&key).await {
            return Ok(hit);
        }
        let cities: Vec<City> = self
            .fetch(
                self.request(Method::GET, CITIES_ENDPOINT)
                    .query(&[("country", country)]),
            )
            .await?
            .into_data()?;
        self.cache().put(&key, &cities, LOOKUP_TTL).await;
        Ok(cities)
    }

    pub async fn lookup(&self, kind: LookupKind) -> Result<Vec<NamedItem>, ApiError> {
        self.get_cached(&kind.cache_key(), kind.endpoint(), LOOKUP_TTL)
            .await
    }
}

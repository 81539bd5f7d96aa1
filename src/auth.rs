// src/auth.rs
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::ApiError;

/// Source of the bearer token attached to API requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError>;
}

/// A fixed token, or none for anonymous browsing.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every request.
#[derive(Debug, Clone)]
pub struct EnvToken {
    pub var: String,
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        Ok(std::env::var(&self.var)
            .ok()
            .filter(|token| !token.trim().is_empty()))
    }
}

/// Session token stored on disk by `jobboard login`.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.trim()).await?;
        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<bool, ApiError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for SessionFile {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(token) => {
                let token = token.trim().to_string();
                Ok(if token.is_empty() { None } else { Some(token) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Tries each provider in order and returns the first token found.
pub struct ChainedTokens(pub Vec<Box<dyn TokenProvider>>);

#[async_trait]
impl TokenProvider for ChainedTokens {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        for provider in &self.0 {
            if let Some(token) = provider.bearer_token().await? {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl SessionClaims {
    pub fn subject(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }
}

/// Read the claims of a JWT without checking its signature. The server
/// verifies tokens; the client only looks at expiry and subject.
pub fn read_claims(token: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    read_claims(token)
        .and_then(|claims| claims.exp)
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
}

/// Opaque (non-JWT) tokens and tokens without `exp` are never treated as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_some_and(|expiry| expiry <= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn jwt(exp: i64) -> String {
        let claims = SessionClaims {
            sub: Some("user-1".to_string()),
            user_id: None,
            exp: Some(exp),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_reads_expiry_without_the_secret() {
        let exp = Utc::now().timestamp() + 3600;
        let token = jwt(exp);
        assert_eq!(token_expiry(&token).unwrap().timestamp(), exp);
        assert!(!is_expired(&token, Utc::now()));
        assert_eq!(read_claims(&token).unwrap().subject(), Some("user-1"));
    }

    #[test]
    fn test_expired_token() {
        let token = jwt(Utc::now().timestamp() - 10);
        assert!(is_expired(&token, Utc::now()));
    }

    #[test]
    fn test_opaque_token_is_not_expired() {
        assert!(token_expiry("not-a-jwt").is_none());
        assert!(!is_expired("not-a-jwt", Utc::now()));
    }

    #[tokio::test]
    async fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::new(dir.path().join("nested").join("session"));

        assert_eq!(session.bearer_token().await.unwrap(), None);
        session.save("abc123\n").await.unwrap();
        assert_eq!(session.bearer_token().await.unwrap(), Some("abc123".to_string()));
        assert!(session.clear().await.unwrap());
        assert!(!session.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_chained_tokens_take_first_available() {
        let chain = ChainedTokens(vec![
            Box::new(StaticToken(None)),
            Box::new(StaticToken(Some("second".to_string()))),
        ]);
        assert_eq!(chain.bearer_token().await.unwrap(), Some("second".to_string()));
    }
}

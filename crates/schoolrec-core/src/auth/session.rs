use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token expiry time in minutes.
/// The backend does not report token lifetime, so sessions are treated as
/// stale after a working day.
const TOKEN_EXPIRY_MINUTES: i64 = 8 * 60;

/// Buffer time before expiry to trigger a silent re-login (10 minutes)
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 10;

/// Authentication passed explicitly to every API call.
///
/// The token is opaque to the client; only its age is inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn new(token: String, username: String) -> Self {
        Self {
            token,
            username,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        Utc::now() > expiry
    }

    /// Check if the session will expire soon and should be refreshed
    pub fn needs_refresh(&self) -> bool {
        let refresh_at =
            self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES - TOKEN_REFRESH_BUFFER_MINUTES);
        Utc::now() > refresh_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        (expiry - Utc::now()).num_minutes().max(0)
    }

    /// The bearer token, or `Unauthenticated` when it is empty or expired.
    pub fn bearer(&self) -> Result<&str, ApiError> {
        if self.token.is_empty() || self.is_expired() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(&self.token)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<AuthContext>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Expired sessions are ignored.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: AuthContext =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: AuthContext) {
        self.data = Some(data);
    }

    /// The current auth context, or `Unauthenticated` if absent or expired.
    pub fn context(&self) -> Result<&AuthContext, ApiError> {
        match self.data {
            Some(ref data) if !data.is_expired() => Ok(data),
            _ => Err(ApiError::Unauthenticated),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.context().is_ok()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("schoolrec-session-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_fresh_context_has_bearer() {
        let ctx = AuthContext::new("tok".to_string(), "admin".to_string());
        assert!(!ctx.is_expired());
        assert!(!ctx.needs_refresh());
        assert_eq!(ctx.bearer().unwrap(), "tok");
    }

    #[test]
    fn test_expired_context_is_unauthenticated() {
        let mut ctx = AuthContext::new("tok".to_string(), "admin".to_string());
        ctx.created_at = Utc::now() - Duration::minutes(TOKEN_EXPIRY_MINUTES + 1);
        assert!(ctx.is_expired());
        assert_eq!(ctx.minutes_until_expiry(), 0);
        assert!(ctx.bearer().unwrap_err().is_unauthenticated());
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let ctx = AuthContext::new(String::new(), "admin".to_string());
        assert!(ctx.bearer().is_err());
    }

    #[test]
    fn test_session_without_data_is_unauthenticated() {
        let session = Session::new(temp_cache_dir("empty"));
        assert!(!session.is_valid());
        assert!(session.context().unwrap_err().is_unauthenticated());
    }

    #[test]
    fn test_session_save_load_clear() {
        let dir = temp_cache_dir("roundtrip");
        let mut session = Session::new(dir.clone());
        session.update(AuthContext::new("abc".to_string(), "registrar".to_string()));
        session.save().unwrap();

        let mut reloaded = Session::new(dir.clone());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.context().unwrap().username, "registrar");

        reloaded.clear().unwrap();
        let mut after_clear = Session::new(dir.clone());
        assert!(!after_clear.load().unwrap());
        let _ = std::fs::remove_dir_all(dir);
    }
}

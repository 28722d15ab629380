//! Persisted OAuth credentials.
//!
//! The token file is plain JSON so any OAuth tool can produce it. Only the
//! refresh exchange is performed here; the browser consent flow is not.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Scope granting full access to the user's drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Environment variable that overrides the token file.
pub const ACCESS_TOKEN_ENV: &str = "DRIVESH_ACCESS_TOKEN";

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Serialized credential set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds after which `access_token` is no longer valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Tokens without an expiry time never expire locally.
    pub fn is_expired(&self, now_secs: u64) -> bool {
        self.expires_at
            .is_some_and(|at| now_secs + EXPIRY_MARGIN_SECS >= at)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Location of the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored token.
    ///
    /// # Errors
    ///
    /// [`CoreError::Auth`] when the file is missing or not a valid token.
    pub fn load(&self) -> CoreResult<StoredToken> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::Auth(format!(
                "no credentials at {}; store an OAuth token there or set {ACCESS_TOKEN_ENV}",
                self.path.display()
            )),
            _ => CoreError::Io(e),
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Auth(format!("unreadable token file: {e}")))
    }

    /// Writes `token`, creating parent directories as needed.
    pub fn save(&self, token: &StoredToken) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| CoreError::Auth(e.to_string()))?;
        write_private(&self.path, content.as_bytes())?;
        Ok(())
    }

    /// Deletes the token file. Succeeds if it is already gone.
    pub fn remove(&self) -> CoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    /// Returns a usable access token.
    ///
    /// The environment override wins. Otherwise the stored token must carry
    /// the drive scope; an expired token is refreshed and saved back.
    pub fn access_token(&self) -> CoreResult<String> {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        let token = self.load()?;
        if !token.has_scope(DRIVE_SCOPE) {
            return Err(CoreError::Auth(format!(
                "stored token does not grant {DRIVE_SCOPE}"
            )));
        }
        if !token.is_expired(now_secs()) {
            return Ok(token.access_token);
        }
        if !token.can_refresh() {
            return Err(CoreError::Auth(
                "stored token expired and cannot be refreshed".to_string(),
            ));
        }
        let refreshed = refresh(&token)?;
        self.save(&refreshed)?;
        tracing::info!("access token refreshed");
        Ok(refreshed.access_token)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

/// Exchanges the refresh token for a new access token.
fn refresh(token: &StoredToken) -> CoreResult<StoredToken> {
    let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
        token.refresh_token.as_deref(),
        token.client_id.as_deref(),
        token.client_secret.as_deref(),
    ) else {
        return Err(CoreError::Auth("token is not refreshable".to_string()));
    };

    let response = reqwest::blocking::Client::new()
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .map_err(|e| CoreError::Auth(format!("token refresh failed: {e}")))?;
    if !response.status().is_success() {
        return Err(CoreError::Auth(format!(
            "token refresh rejected ({})",
            response.status()
        )));
    }
    let body: RefreshResponse = response
        .json()
        .map_err(|e| CoreError::Auth(format!("token refresh failed: {e}")))?;

    Ok(StoredToken {
        access_token: body.access_token,
        expires_at: body.expires_in.map(|secs| now_secs() + secs),
        ..token.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token() -> StoredToken {
        StoredToken {
            access_token: "ya29.abc".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Some(1_000),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            scopes: vec![DRIVE_SCOPE.to_string()],
        }
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("nested").join("token.json"));

        store.save(&token()).unwrap();
        assert_eq!(store.load().unwrap(), token());
    }

    #[test]
    fn load_missing_is_auth_error() {
        let tmp = TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("token.json"));
        assert!(matches!(store.load(), Err(CoreError::Auth(_))));
    }

    #[test]
    fn load_garbage_is_auth_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(TokenStore::new(path).load(), Err(CoreError::Auth(_))));
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("token.json"));
        store.save(&token()).unwrap();

        store.remove().unwrap();
        assert!(!store.path().exists());
        store.remove().unwrap();
    }

    #[test]
    fn expiry_uses_margin() {
        let t = token();
        assert!(!t.is_expired(100));
        assert!(t.is_expired(950));
        assert!(t.is_expired(2_000));
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let t = StoredToken {
            expires_at: None,
            ..token()
        };
        assert!(!t.is_expired(u64::MAX / 2));
    }

    #[test]
    fn refreshability_needs_client_credentials() {
        assert!(token().can_refresh());
        let t = StoredToken {
            client_secret: None,
            ..token()
        };
        assert!(!t.can_refresh());
    }

    #[test]
    fn minimal_json_is_accepted() {
        let t: StoredToken = serde_json::from_str(r#"{"access_token":"x"}"#).unwrap();
        assert_eq!(t.access_token, "x");
        assert!(t.scopes.is_empty());
        assert!(!t.has_scope(DRIVE_SCOPE));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("token.json"));
        store.save(&token()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

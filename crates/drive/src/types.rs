use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const SCOPE_INSTALL: &str = "https://www.googleapis.com/auth/drive.install";
pub const SCOPE_FILE: &str = "https://www.googleapis.com/auth/drive.file";
pub const SCOPE_OPENID: &str = "openid";

/// Mime type Drive uses for files backed by a realtime document.
pub const REALTIME_MIME_TYPE: &str = "application/vnd.google-apps.drive-sdk";

/// Client modules requested before the first authorization attempt.
pub const CLIENT_MODULES: [&str; 3] = ["auth:client", "drive-realtime", "drive-share"];

pub fn default_scopes() -> Vec<String> {
    [SCOPE_INSTALL, SCOPE_FILE, SCOPE_OPENID]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parameters of a single authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub client_id: String,
    pub scope: Vec<String>,
    pub user_id: Option<String>,
    pub immediate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Treats tokens expiring within the next minute as already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => at - Duration::seconds(60) <= now,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserInfo {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// A Drive file resource as returned by `files.insert`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: Option<String>,
    pub title: Option<String>,
    pub mime_type: Option<String>,
    pub alternate_link: Option<String>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    pub id: Option<String>,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<String>,
}

use crate::error::{DriveError, DriveResult};
use crate::types::{Credential, FileResource, Permission, UserInfo, REALTIME_MIME_TYPE};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v2";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Resolves the stable id of the signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_id(&self, credential: &Credential) -> DriveResult<Option<String>>;
}

/// Creates the Drive file that backs a new realtime document.
#[async_trait]
pub trait FileCreator: Send + Sync {
    async fn create_file(&self, credential: &Credential, title: &str) -> DriveResult<FileResource>;
}

#[derive(Clone)]
pub struct DriveApi {
    client: Client,
    base_url: String,
    userinfo_url: String,
}

impl Default for DriveApi {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveApi {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("realtime-pad/0.2")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: DRIVE_API_BASE.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }

    /// Points the client at another host, e.g. a local emulator.
    pub fn with_endpoints(mut self, base_url: &str, userinfo_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.userinfo_url = userinfo_url.to_string();
        self
    }

    pub async fn user_info(&self, credential: &Credential) -> DriveResult<UserInfo> {
        tracing::debug!("GET {}", self.userinfo_url);
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(DriveError::Auth(error_message(&data)));
        }
        if !status.is_success() {
            return Err(DriveError::Api(format!(
                "userinfo returned {}: {}",
                status,
                error_message(&data)
            )));
        }

        serde_json::from_value(data).map_err(|e| DriveError::Api(e.to_string()))
    }

    /// Inserts a realtime-backed file. The body is returned as is, including
    /// Drive's `error` object when the request was rejected.
    pub async fn insert_file(&self, credential: &Credential, title: &str) -> DriveResult<FileResource> {
        let body = json!({
            "mimeType": REALTIME_MIME_TYPE,
            "title": title,
        });
        tracing::debug!(title, "POST {}/files", self.base_url);
        let response = self
            .client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await?;

        let data: Value = response.json().await?;
        Ok(parse_file_resource(data))
    }

    pub async fn insert_permission(
        &self,
        credential: &Credential,
        file_id: &str,
        email: &str,
        role: &str,
    ) -> DriveResult<Permission> {
        let body = json!({
            "role": role,
            "type": "user",
            "value": email,
        });
        let response = self
            .client
            .post(format!("{}/files/{}/permissions", self.base_url, file_id))
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(DriveError::Auth(error_message(&data)));
        }
        if !status.is_success() {
            return Err(DriveError::Api(format!(
                "Failed to share {}: {}",
                file_id,
                error_message(&data)
            )));
        }

        serde_json::from_value(data).map_err(|e| DriveError::Api(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for DriveApi {
    async fn user_id(&self, credential: &Credential) -> DriveResult<Option<String>> {
        Ok(self.user_info(credential).await?.id)
    }
}

#[async_trait]
impl FileCreator for DriveApi {
    async fn create_file(&self, credential: &Credential, title: &str) -> DriveResult<FileResource> {
        self.insert_file(credential, title).await
    }
}

fn parse_file_resource(data: Value) -> FileResource {
    match serde_json::from_value::<FileResource>(data.clone()) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Unexpected files.insert body: {e}");
            FileResource {
                error: Some(data),
                ..FileResource::default()
            }
        }
    }
}

fn error_message(data: &Value) -> String {
    data.get("error")
        .and_then(|e| {
            e.get("message")
                .and_then(|m| m.as_str())
                .or_else(|| e.as_str())
        })
        .unwrap_or("unknown error")
        .to_string()
}

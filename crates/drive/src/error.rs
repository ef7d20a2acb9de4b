use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl DriveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DriveError::Auth(_) => "Authorization failed. Press the authorize button to sign in.",
            DriveError::Network(_) => "Network error. Check your connection.",
            DriveError::Api(_) => "Google Drive rejected the request.",
            DriveError::Config(_) => "The client is not configured. Check config.toml.",
            DriveError::Storage(_) => "Could not read or write the stored credential.",
        }
    }

    /// Errors that the interactive flow can recover from.
    pub fn is_auth(&self) -> bool {
        matches!(self, DriveError::Auth(_))
    }
}

pub type DriveResult<T> = Result<T, DriveError>;

impl From<anyhow::Error> for DriveError {
    fn from(e: anyhow::Error) -> Self {
        map_anyhow_error(e)
    }
}

pub fn map_anyhow_error(e: anyhow::Error) -> DriveError {
    map_anyhow_error_ref(&e)
}

pub fn map_anyhow_error_ref(e: &anyhow::Error) -> DriveError {
    let msg = e.to_string();
    if msg.contains("invalid_grant")
        || msg.contains("unauthorized")
        || msg.contains("401")
        || msg.contains("redirect")
    {
        DriveError::Auth(msg)
    } else if msg.contains("decrypt")
        || msg.contains("encrypt")
        || msg.contains("directories")
        || msg.contains("credential")
    {
        DriveError::Storage(msg)
    } else {
        DriveError::Api(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn classifies_grant_failures_as_auth() {
        let err = map_anyhow_error(anyhow!("token endpoint said invalid_grant"));
        assert!(err.is_auth());
    }

    #[test]
    fn classifies_cipher_failures_as_storage() {
        let err = map_anyhow_error(anyhow!("Decryption failed: could not decrypt"));
        assert!(matches!(err, DriveError::Storage(_)));
    }

    #[test]
    fn classifies_store_and_redirect_failures() {
        let err = map_anyhow_error(anyhow!("Failed to parse credential file"));
        assert!(matches!(err, DriveError::Storage(_)));

        let err = map_anyhow_error(anyhow!("Failed to accept the redirect connection"));
        assert!(err.is_auth());
    }

    #[test]
    fn falls_back_to_api_errors() {
        let err = map_anyhow_error(anyhow!("quota exceeded"));
        assert!(matches!(err, DriveError::Api(_)));
        assert_eq!(err.user_message(), "Google Drive rejected the request.");
    }
}

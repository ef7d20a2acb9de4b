use crate::error::{DriveError, DriveResult};
use crate::types::{AuthRequest, Credential};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use directories::ProjectDirs;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use rand::Rng;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// How long a loopback connection may take to send its request line.
const REDIRECT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Obtains OAuth credentials, either silently or through user consent.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn load_modules(&self, modules: &[&str]) -> DriveResult<()>;

    /// `request.immediate` forbids any user interaction; the attempt fails
    /// instead of prompting.
    async fn authorize(&self, request: &AuthRequest) -> DriveResult<Credential>;
}

/// Encrypted on-disk copy of the last credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn open_default() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "realtime-pad", "realtime-pad")
            .ok_or_else(|| anyhow!("Could not determine project directories"))?;
        Ok(Self::at(proj_dirs.data_dir()))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> Result<Option<Credential>> {
        let path = self.credential_path();
        if !path.exists() {
            return Ok(None);
        }

        let encrypted = fs::read(&path)
            .with_context(|| format!("Failed to read credential file {}", path.display()))?;
        let decrypted = self.decrypt(&encrypted)?;
        let credential: Credential =
            serde_json::from_slice(&decrypted).context("Failed to parse credential file")?;
        Ok(Some(credential))
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(credential)?;
        let encrypted = self.encrypt(&json)?;
        write_secure_file(&self.credential_path(), &encrypted)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.credential_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn credential_path(&self) -> PathBuf {
        self.dir.join("credential.bin")
    }

    fn secret_key_path(&self) -> PathBuf {
        self.dir.join(".secret_key")
    }

    fn get_or_create_key(&self) -> Result<[u8; 32]> {
        let path = self.secret_key_path();

        if path.exists() {
            let key_bytes = fs::read(&path)?;
            if key_bytes.len() == 32 {
                let mut key = [0u8; 32];
                key.copy_from_slice(&key_bytes);
                return Ok(key);
            }
        }

        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key);
        fs::create_dir_all(&self.dir)?;
        write_secure_file(&path, &key)?;
        Ok(key)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| anyhow!("Failed to encrypt credential"))?;

        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        if ciphertext.len() < 12 {
            return Err(anyhow!("Failed to decrypt credential: truncated file"));
        }

        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let nonce = Nonce::from_slice(&ciphertext[..12]);
        cipher
            .decrypt(nonce, &ciphertext[12..])
            .map_err(|_| anyhow!("Failed to decrypt credential"))
    }
}

fn write_secure_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Google OAuth 2.0 for an installed application.
///
/// Silent attempts reuse the stored credential, refreshing it when it has
/// expired. Interactive attempts publish a consent URL on [`Self::prompts`]
/// and wait for Google to redirect the browser to a loopback listener.
pub struct GoogleAuthProvider {
    client_secret: Option<String>,
    redirect_port: u16,
    store: CredentialStore,
    prompt_tx: watch::Sender<Option<String>>,
}

impl GoogleAuthProvider {
    pub fn new(client_secret: Option<String>, redirect_port: u16, store: CredentialStore) -> Self {
        let (prompt_tx, _) = watch::channel(None);
        Self {
            client_secret: client_secret.filter(|s| !s.is_empty()),
            redirect_port,
            store,
            prompt_tx,
        }
    }

    /// Consent URL of the interactive attempt in progress, if any.
    pub fn prompts(&self) -> watch::Receiver<Option<String>> {
        self.prompt_tx.subscribe()
    }

    fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}", self.redirect_port)
    }

    fn oauth_client(&self, client_id: &str) -> DriveResult<BasicClient> {
        if client_id.is_empty() {
            return Err(DriveError::Config("client_id is not set".to_string()));
        }
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| DriveError::Config(e.to_string()))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| DriveError::Config(e.to_string()))?;
        let redirect_url =
            RedirectUrl::new(self.redirect_uri()).map_err(|e| DriveError::Config(e.to_string()))?;

        Ok(BasicClient::new(
            ClientId::new(client_id.to_string()),
            self.client_secret.clone().map(ClientSecret::new),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    async fn authorize_silently(&self, request: &AuthRequest) -> DriveResult<Credential> {
        let stored = self
            .store
            .load()?
            .ok_or_else(|| DriveError::Auth("no stored credential".to_string()))?;

        if !stored.is_expired(Utc::now()) {
            return Ok(stored);
        }

        let refresh_token = stored
            .refresh_token
            .clone()
            .ok_or_else(|| DriveError::Auth("stored credential expired".to_string()))?;

        tracing::debug!("Refreshing expired access token");
        let client = self.oauth_client(&request.client_id)?;
        let token = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.clone()))
            .request_async(async_http_client)
            .await
            .map_err(|e| DriveError::Auth(format!("refresh failed: {e}")))?;

        let mut credential = credential_from_token(&token);
        if credential.refresh_token.is_none() {
            credential.refresh_token = Some(refresh_token);
        }
        self.persist(&credential);
        Ok(credential)
    }

    async fn authorize_with_consent(&self, request: &AuthRequest) -> DriveResult<Credential> {
        let client = self.oauth_client(&request.client_id)?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(request.scope.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(pkce_challenge);
        if let Some(ref user_id) = request.user_id {
            auth_request = auth_request.add_extra_param("login_hint", user_id.clone());
        }
        let (auth_url, csrf_token) = auth_request.url();

        let listener = TcpListener::bind(("127.0.0.1", self.redirect_port))
            .await
            .map_err(|e| DriveError::Auth(format!("cannot listen for the redirect: {e}")))?;

        tracing::info!("Open this URL to authorize realtime-pad: {}", auth_url);
        let _ = self.prompt_tx.send(Some(auth_url.to_string()));

        let callback = wait_for_callback(&listener, REDIRECT_READ_TIMEOUT).await;
        let _ = self.prompt_tx.send(None);
        let callback = callback?;

        if let Some(error) = callback.error {
            return Err(DriveError::Auth(format!("consent denied: {error}")));
        }
        if callback.state.as_deref() != Some(csrf_token.secret().as_str()) {
            return Err(DriveError::Auth("state mismatch in redirect".to_string()));
        }
        let code = callback
            .code
            .ok_or_else(|| DriveError::Auth("redirect carried no code".to_string()))?;

        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| DriveError::Auth(format!("code exchange failed: {e}")))?;

        let credential = credential_from_token(&token);
        self.persist(&credential);
        Ok(credential)
    }

    fn persist(&self, credential: &Credential) {
        if let Err(e) = self.store.save(credential) {
            tracing::warn!("Failed to store credential: {e}");
        }
    }
}

#[async_trait]
impl AuthProvider for GoogleAuthProvider {
    async fn load_modules(&self, modules: &[&str]) -> DriveResult<()> {
        fs::create_dir_all(self.store.dir()).with_context(|| {
            format!("Failed to create credential directory {}", self.store.dir().display())
        })?;
        if self.redirect_port == 0 {
            return Err(DriveError::Config("redirect_port must be set".to_string()));
        }
        tracing::debug!(?modules, "Client modules ready");
        Ok(())
    }

    async fn authorize(&self, request: &AuthRequest) -> DriveResult<Credential> {
        if request.immediate {
            self.authorize_silently(request).await
        } else {
            self.authorize_with_consent(request).await
        }
    }
}

/// Provider for running without a Google account against an in-process
/// realtime service. Every attempt succeeds silently.
#[derive(Debug, Default, Clone)]
pub struct OfflineAuth;

#[async_trait]
impl AuthProvider for OfflineAuth {
    async fn load_modules(&self, _modules: &[&str]) -> DriveResult<()> {
        Ok(())
    }

    async fn authorize(&self, _request: &AuthRequest) -> DriveResult<Credential> {
        Ok(Credential::bearer("offline"))
    }
}

#[async_trait]
impl crate::api::IdentityProvider for OfflineAuth {
    async fn user_id(&self, _credential: &Credential) -> DriveResult<Option<String>> {
        Ok(None)
    }
}

fn credential_from_token<T: TokenResponse<oauth2::basic::BasicTokenType>>(token: &T) -> Credential {
    Credential {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        expires_at: token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RedirectCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Parses `GET /?code=..&state=.. HTTP/1.1`. Requests without `code` or
/// `error` (favicon probes and the like) yield `None`.
fn parse_redirect(request_line: &str) -> Option<RedirectCallback> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let url = Url::parse(&format!("http://127.0.0.1{target}")).ok()?;

    let mut callback = RedirectCallback::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => callback.code = Some(value.into_owned()),
            "state" => callback.state = Some(value.into_owned()),
            "error" => callback.error = Some(value.into_owned()),
            _ => {}
        }
    }

    if callback.code.is_none() && callback.error.is_none() {
        return None;
    }
    Some(callback)
}

/// Serves the loopback listener until a request carries the OAuth
/// redirect. Connections that stay silent past `read_timeout` are dropped.
async fn wait_for_callback(listener: &TcpListener, read_timeout: Duration) -> Result<RedirectCallback> {
    loop {
        let (mut stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept the redirect connection")?;
        let mut request_line = String::new();
        let read = {
            let mut reader = BufReader::new(&mut stream);
            tokio::time::timeout(read_timeout, reader.read_line(&mut request_line)).await
        };
        match read {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::debug!(%peer, "Dropping unreadable redirect connection: {e}");
                continue;
            }
            Err(_) => {
                tracing::debug!(%peer, "Dropping silent redirect connection");
                continue;
            }
        }

        let callback = parse_redirect(&request_line);
        let body = if callback.is_some() {
            "Authorization received. You can close this window and return to realtime-pad."
        } else {
            "Waiting for authorization."
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        if let Err(e) = stream.write_all(response.as_bytes()).await {
            tracing::debug!(%peer, "Failed to answer the redirect: {e}");
        }
        let _ = stream.shutdown().await;

        if let Some(callback) = callback {
            return Ok(callback);
        }
    }
}

use crate::page::AuthControl;
use parking_lot::RwLock;
use realtime_pad_drive::api::IdentityProvider;
use realtime_pad_drive::auth::AuthProvider;
use realtime_pad_drive::{default_scopes, AuthRequest, Credential, DriveResult, CLIENT_MODULES};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AuthenticatingSilent,
    AwaitingUserGesture,
    AuthenticatingInteractive,
    Authenticated,
}

/// Holds the OAuth credential and the resolved user id for one session.
///
/// Authorization is attempted silently first. When that fails the auth
/// control is enabled and each click makes one interactive attempt; a failed
/// interactive attempt leaves the control armed for the next click. There is
/// no timeout: if the user never clicks, [`Authorizer::authorize`] never
/// returns.
pub struct Authorizer {
    client_id: String,
    scopes: Vec<String>,
    user_id: RwLock<Option<String>>,
    credential: RwLock<Option<Credential>>,
    control: Arc<dyn AuthControl>,
    provider: Arc<dyn AuthProvider>,
    identity: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
}

impl Authorizer {
    pub fn new(
        client_id: impl Into<String>,
        user_id: Option<String>,
        provider: Arc<dyn AuthProvider>,
        identity: Arc<dyn IdentityProvider>,
        control: Arc<dyn AuthControl>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            client_id: client_id.into(),
            scopes: default_scopes(),
            user_id: RwLock::new(user_id),
            credential: RwLock::new(None),
            control,
            provider,
            identity,
            state,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential.read().clone()
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Loads the client modules, then authorizes. Only a module load
    /// failure is reported; authorization itself never fails.
    pub async fn start(&self) -> DriveResult<()> {
        self.provider.load_modules(&CLIENT_MODULES).await?;
        self.authorize().await;
        Ok(())
    }

    pub async fn authorize(&self) {
        self.set_state(AuthState::AuthenticatingSilent);
        let credential = match self.provider.authorize(&self.request(true)).await {
            Ok(credential) => credential,
            Err(e) => {
                if e.is_auth() {
                    info!("Silent authorization failed, waiting for the user: {e}");
                } else {
                    warn!("Silent authorization could not run, waiting for the user: {e}");
                }
                self.authorize_interactively().await
            }
        };

        self.control.set_enabled(false);
        *self.credential.write() = Some(credential);
        self.fetch_user_id().await;
        self.set_state(AuthState::Authenticated);
        info!(user_id = ?self.user_id(), "Authorized");
    }

    async fn authorize_interactively(&self) -> Credential {
        loop {
            self.control.set_enabled(true);
            self.set_state(AuthState::AwaitingUserGesture);
            self.control.wait_for_click().await;

            self.set_state(AuthState::AuthenticatingInteractive);
            match self.provider.authorize(&self.request(false)).await {
                Ok(credential) => return credential,
                Err(e) => warn!("Interactive authorization failed: {e}"),
            }
        }
    }

    /// Best effort: a missing id or a failed lookup keeps the current one.
    pub async fn fetch_user_id(&self) {
        let Some(credential) = self.credential() else {
            return;
        };
        match self.identity.user_id(&credential).await {
            Ok(Some(id)) => *self.user_id.write() = Some(id),
            Ok(None) => debug!("Identity lookup returned no id"),
            Err(e) => warn!("Identity lookup failed: {e}"),
        }
    }

    fn request(&self, immediate: bool) -> AuthRequest {
        AuthRequest {
            client_id: self.client_id.clone(),
            scope: self.scopes.clone(),
            user_id: self.user_id(),
            immediate,
        }
    }

    fn set_state(&self, state: AuthState) {
        self.state.send_replace(state);
    }
}

use crate::loader::DEFAULT_TITLE;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_share_role")]
    pub share_role: String,
}

fn default_redirect_port() -> u16 {
    8085
}

fn default_auto_create() -> bool {
    true
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_share_role() -> String {
    "writer".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            auto_create: default_auto_create(),
            default_title: default_title(),
            share_role: default_share_role(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_port: default_redirect_port(),
            },
            loader: LoaderConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::info!("Using default configuration ({}): {e}", path.display());
                Self::default()
            }
        }
    }

    /// `REALTIME_PAD_CLIENT_ID` and `REALTIME_PAD_CLIENT_SECRET` win over
    /// the file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("REALTIME_PAD_CLIENT_ID").ok(),
            std::env::var("REALTIME_PAD_CLIENT_SECRET").ok(),
        );
    }

    fn apply_overrides(&mut self, client_id: Option<String>, client_secret: Option<String>) {
        if let Some(id) = client_id.filter(|v| !v.is_empty()) {
            self.google.client_id = id;
        }
        if let Some(secret) = client_secret.filter(|v| !v.is_empty()) {
            self.google.client_secret = secret;
        }
    }

    /// Without a client id the page runs against the in-process service only.
    pub fn is_offline(&self) -> bool {
        self.google.client_id.is_empty()
    }
}

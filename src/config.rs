//! Client configuration
//!
//! Everything the client needs besides the host primitives: the server base URL,
//! endpoint paths, the texts shown by the UI, and the token policy. All fields
//! have defaults, so an empty TOML document is a valid configuration.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::model::structs::{BearerStyle, ExpiryUnit};

pub const HOST_ENV: &str = "WEAPP_API_HOST";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every relative path is appended to, without trailing slash
    pub host: String,
    pub login_path: String,
    pub current_authorization_path: String,
    pub loading_title: String,
    pub server_error_title: String,
    pub server_error_content: String,
    pub accept_invalid_certs: bool,
    pub token: TokenPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "http://larabbs.test/api".to_string(),
            login_path: "weapp/authorizations".to_string(),
            current_authorization_path: "authorizations/current".to_string(),
            loading_title: "加载中".to_string(),
            server_error_title: "提示".to_string(),
            server_error_content: "服务器错误，请与管理员联系或重试".to_string(),
            accept_invalid_certs: false,
            token: TokenPolicy::default(),
        }
    }
}

/// How tokens returned by the server are interpreted and sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TokenPolicy {
    pub login_expires_in: ExpiryUnit,
    pub refresh_expires_in: ExpiryUnit,
    pub refresh_bearer: BearerStyle,
}

impl TokenPolicy {
    /// Human readable notes for every setting that departs from the defaults.
    pub fn deviations(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.login_expires_in != self.refresh_expires_in {
            notes.push(format!(
                "login expires_in is read in {:?} but refresh expires_in in {:?}",
                self.login_expires_in, self.refresh_expires_in
            ));
        }
        if self.refresh_bearer == BearerStyle::Compact {
            notes.push("refresh sends `Bearer<token>` without a separating space".to_string());
        }
        notes
    }
}

impl ApiConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded client configuration from {}", path.display());
        Ok(config)
    }

    /// `WEAPP_API_HOST` overrides `host` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var(HOST_ENV) {
            if !host.is_empty() {
                self.host = host;
            }
        }
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }
}

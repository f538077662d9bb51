use futures::lock::Mutex;
use serde_json::{Map, Value};

use crate::app::session::SessionStore;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::interface::{Host, HostLogin, HostNetwork, HostUi};
use crate::model::dtos::{Method, RequestOptions, Response};
use crate::model::structs::{BearerStyle, TokenPayload};

const AUTHORIZATION: &str = "Authorization";

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Authentication-aware API client.
///
/// Status codes are never errors: every operation hands back the raw
/// [`Response`] and leaves success checks to the caller. Errors are transport
/// or host failures, plus malformed token bodies on a success status.
pub struct ApiClient<H> {
    host: H,
    config: ApiConfig,
    // serializes get_token so concurrent callers refresh at most once
    token_guard: Mutex<()>,
}

impl<H: Host> ApiClient<H> {
    pub fn new(host: H, config: ApiConfig) -> Self {
        for note in config.token.deviations() {
            log::warn!("Token policy: {note}");
        }

        Self {
            host,
            config,
            token_guard: Mutex::new(()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn sessions(&self) -> SessionStore<'_, H> {
        SessionStore::new(&self.host)
    }

    /// Send a request to `host + "/" + url`.
    ///
    /// Shows the loading indicator around the call when `show_loading` is set
    /// and the server error dialog when the status is 500.
    pub async fn request(
        &self,
        options: impl Into<RequestOptions>,
        show_loading: bool,
    ) -> Result<Response> {
        let mut options = options.into();

        if show_loading {
            self.host.show_loading(&self.config.loading_title);
        }

        options.url = self.config.url_for(&options.url);
        let result = self.host.request(&options).await;

        if show_loading {
            self.host.hide_loading();
        }

        let response = result?;
        if response.status_code == 500 {
            log::error!("{} {} -> 500", options.effective_method(), options.url);
            self.host.show_modal(
                &self.config.server_error_title,
                &self.config.server_error_content,
            );
        }

        Ok(response)
    }

    /// Exchange a fresh login code for a token; persisted on 201.
    pub async fn login(&self, mut params: Map<String, Value>) -> Result<Response> {
        // code 只能使用一次，所以每次单独获取
        let code = self.host.login().await?;
        params.insert("code".to_string(), Value::String(code));

        let auth_response = self
            .request(
                RequestOptions::new(self.config.login_path.as_str())
                    .method(Method::Post)
                    .data(Value::Object(params)),
                true,
            )
            .await?;

        if auth_response.status_code == 201 {
            let session = TokenPayload::from_response(&auth_response)?
                .into_session(now_millis(), self.config.token.login_expires_in);
            self.sessions().save(&session)?;
            log::info!("Logged in, token valid until {:?}", session.expired_at);
        } else {
            log::warn!("Login answered {}", auth_response.status_code);
        }

        Ok(auth_response)
    }

    /// Trade `access_token` for a new one; persisted on 200.
    ///
    /// Goes straight to the host network: no loading indicator, no error dialog.
    pub async fn refresh_token(&self, access_token: &str) -> Result<Response> {
        let url = self.config.url_for(&self.config.current_authorization_path);
        let options = RequestOptions::new(url).method(Method::Put).header(
            AUTHORIZATION,
            self.config.token.refresh_bearer.header_value(access_token),
        );

        let refresh_response = self.host.request(&options).await?;

        if refresh_response.status_code == 200 {
            let session = TokenPayload::from_response(&refresh_response)?
                .into_session(now_millis(), self.config.token.refresh_expires_in);
            self.sessions().save(&session)?;
            log::info!("Token refreshed, valid until {:?}", session.expired_at);
        }

        Ok(refresh_response)
    }

    /// Current token, refreshing or logging in again when the cached one is stale.
    ///
    /// Returns `None` when nothing is cached. When both refresh and login fail
    /// the stale token is returned unchanged.
    pub async fn get_token(&self) -> Result<Option<String>> {
        let _guard = self.token_guard.lock().await;

        let Some(session) = self.sessions().load() else {
            return Ok(None);
        };

        if !session.is_stale(now_millis()) {
            return Ok(Some(session.access_token));
        }

        let refresh_response = self.refresh_token(&session.access_token).await?;
        if refresh_response.status_code == 200 {
            return Ok(Some(
                TokenPayload::from_response(&refresh_response)?.access_token,
            ));
        }

        log::warn!(
            "Token refresh answered {}, logging in again",
            refresh_response.status_code
        );
        let auth_response = self.login(Map::new()).await?;
        if auth_response.status_code == 201 {
            return Ok(Some(
                TokenPayload::from_response(&auth_response)?.access_token,
            ));
        }

        Ok(Some(session.access_token))
    }

    /// [`ApiClient::request`] with `Authorization: Bearer <token>` added.
    pub async fn auth_request(
        &self,
        options: impl Into<RequestOptions>,
        show_loading: bool,
    ) -> Result<Response> {
        let mut options = options.into();

        match self.get_token().await? {
            Some(token) => {
                options.header.insert(
                    AUTHORIZATION.to_string(),
                    BearerStyle::Spaced.header_value(&token),
                );
            }
            None => {
                log::warn!(
                    "No access token cached, sending {} unauthenticated",
                    options.url
                );
            }
        }

        self.request(options, show_loading).await
    }

    /// Revoke the cached token; all host storage is cleared on 204.
    pub async fn logout(&self) -> Result<Response> {
        let url = self.config.url_for(&self.config.current_authorization_path);
        let mut options = RequestOptions::new(url).method(Method::Delete);

        match self.sessions().access_token() {
            Some(token) => {
                options.header.insert(
                    AUTHORIZATION.to_string(),
                    BearerStyle::Spaced.header_value(&token),
                );
            }
            None => log::warn!("Logging out without a cached token"),
        }

        let logout_response = self.host.request(&options).await?;

        if logout_response.status_code == 204 {
            self.sessions().clear_all()?;
            log::info!("Logged out, storage cleared");
        }

        Ok(logout_response)
    }
}

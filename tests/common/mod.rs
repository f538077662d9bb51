#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use weapp_api::client::{MemoryStorage, Platform};
use weapp_api::error::{ErrorKind, Result};
use weapp_api::interface::{HostLogin, HostNetwork, HostUi};
use weapp_api::{ApiClient, ApiConfig, RequestOptions, Response};

pub const HOST: &str = "https://api.test/api";

/// Replies with queued responses in order and records every request.
/// An empty queue behaves like a transport failure.
#[derive(Default)]
pub struct ScriptedNetwork {
    replies: Mutex<VecDeque<Response>>,
    pub sent: Mutex<Vec<RequestOptions>>,
}

impl ScriptedNetwork {
    pub fn reply(&self, status_code: u16, data: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Response::new(status_code, data));
    }

    pub fn sent(&self) -> Vec<RequestOptions> {
        self.sent.lock().unwrap().clone()
    }
}

impl HostNetwork for ScriptedNetwork {
    async fn request(&self, options: &RequestOptions) -> Result<Response> {
        self.sent.lock().unwrap().push(options.clone());
        tokio::task::yield_now().await;
        let reply = self.replies.lock().unwrap().pop_front();
        reply.ok_or_else(|| ErrorKind::HostError("connection refused".to_string()).into())
    }
}

/// Hands out `code-1`, `code-2`, ...
#[derive(Default)]
pub struct CountingLogin {
    pub calls: Mutex<u32>,
}

impl HostLogin for CountingLogin {
    async fn login(&self) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        Ok(format!("code-{}", *calls))
    }
}

#[derive(Default)]
pub struct RecordingUi {
    pub events: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn modal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with("modal:"))
            .count()
    }
}

impl HostUi for RecordingUi {
    fn show_loading(&self, title: &str) {
        self.events.lock().unwrap().push(format!("loading:{title}"));
    }

    fn hide_loading(&self) {
        self.events.lock().unwrap().push("hide".to_string());
    }

    fn show_modal(&self, title: &str, content: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("modal:{title}:{content}"));
    }
}

pub type FakeHost = Platform<ScriptedNetwork, CountingLogin, MemoryStorage, RecordingUi>;

pub fn client_with(config: ApiConfig) -> ApiClient<FakeHost> {
    ApiClient::new(
        Platform::new(
            ScriptedNetwork::default(),
            CountingLogin::default(),
            MemoryStorage::new(),
            RecordingUi::default(),
        ),
        config,
    )
}

pub fn client() -> ApiClient<FakeHost> {
    client_with(ApiConfig::new(HOST))
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn token_body(token: &str, expires_in: i64) -> Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    })
}

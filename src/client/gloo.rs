//! WASM host implementation using gloo
//!
//! Requests go through the browser's fetch API via gloo_net, storage is
//! `window.localStorage`, and the server error dialog is `window.alert`.
//! Browsers have no login-code primitive, so pair these with
//! [`crate::client::FnLogin`] wrapping whatever the page uses.

use gloo_net::http::{Method as GlooMethod, RequestBuilder};
use gloo_storage::{LocalStorage, Storage};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::interface::{HostNetwork, HostStorage, HostUi};
use crate::model::dtos::{Method, RequestOptions, Response};

/// Network primitive backed by the browser's fetch API
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooNetwork;

fn to_gloo_method(method: Method) -> GlooMethod {
    match method {
        Method::Get => GlooMethod::GET,
        Method::Post => GlooMethod::POST,
        Method::Put => GlooMethod::PUT,
        Method::Patch => GlooMethod::PATCH,
        Method::Delete => GlooMethod::DELETE,
        Method::Head => GlooMethod::HEAD,
        Method::Options => GlooMethod::OPTIONS,
    }
}

impl HostNetwork for GlooNetwork {
    async fn request(&self, options: &RequestOptions) -> Result<Response> {
        let method = options.effective_method();
        log::debug!("{} {}", method, options.url);

        let mut builder = RequestBuilder::new(&options.url)
            .method(to_gloo_method(method))
            .header("Accept", "application/json");
        for (name, value) in &options.header {
            builder = builder.header(name, value);
        }

        let request = match &options.data {
            Some(data) => builder.json(data)?,
            None => builder.build()?,
        };
        let resp = request.send().await?;

        let status_code = resp.status();
        let header: HashMap<String, String> = resp.headers().entries().collect();
        let text = resp.text().await?;
        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        log::debug!("{} {} -> {}", method, options.url, status_code);
        Ok(Response {
            status_code,
            data,
            header,
        })
    }
}

/// `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageHost;

impl HostStorage for LocalStorageHost {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::set(key, value)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        LocalStorage::clear();
        Ok(())
    }
}

/// Loading state goes to the console; the error dialog is a blocking alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserUi;

impl HostUi for BrowserUi {
    fn show_loading(&self, title: &str) {
        log::info!("{title}...");
    }

    fn hide_loading(&self) {
        log::debug!("loading hidden");
    }

    fn show_modal(&self, title: &str, content: &str) {
        log::error!("[{title}] {content}");
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.alert_with_message(&format!("{title}\n{content}")) {
                log::warn!("alert failed: {e:?}");
            }
        }
    }
}

//! No-WASM host implementation
//!
//! Network goes through reqwest, storage is a JSON file on disk, UI affordances
//! are written to the log and stderr, and login codes come from the command
//! line or stdin.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::client::memory::FixedCodeLogin;
use crate::client::platform::Platform;
use crate::config::ApiConfig;
use crate::error::{ErrorKind, Result};
use crate::interface::{HostLogin, HostNetwork, HostStorage, HostUi};
use crate::model::dtos::{Method, RequestOptions, Response};

/// Network primitive backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestNetwork {
    client: Client,
}

impl ReqwestNetwork {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn build_headers(options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.header {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ErrorKind::ParseError(format!("Invalid header name {name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ErrorKind::ParseError(format!("Invalid header {name}: {e}")))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

/// GET/HEAD carry object data as query string, like the mini-program request API.
fn query_pairs(data: &Value) -> Option<Vec<(String, String)>> {
    let object = data.as_object()?;
    Some(
        object
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), v)
            })
            .collect(),
    )
}

impl HostNetwork for ReqwestNetwork {
    async fn request(&self, options: &RequestOptions) -> Result<Response> {
        let method = options.effective_method();
        log::debug!("{} {}", method, options.url);

        let mut builder = self
            .client
            .request(to_reqwest_method(method), &options.url)
            .headers(Self::build_headers(options)?);

        if let Some(data) = &options.data {
            builder = match (method, query_pairs(data)) {
                (Method::Get | Method::Head, Some(pairs)) => builder.query(&pairs),
                _ => builder.json(data),
            };
        }

        let resp = builder.send().await?;
        let status_code = resp.status().as_u16();
        let header = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
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

/// Storage persisted as a flat JSON object in a file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl HostStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        self.flush(&entries)
    }
}

/// Terminal stand-in for the loading toast and the modal dialog
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUi;

impl HostUi for LogUi {
    fn show_loading(&self, title: &str) {
        log::info!("{title}...");
    }

    fn hide_loading(&self) {
        log::debug!("loading hidden");
    }

    fn show_modal(&self, title: &str, content: &str) {
        log::error!("[{title}] {content}");
        eprintln!("【{title}】{content}");
    }
}

/// Reads a login code from stdin each time one is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinLogin;

impl HostLogin for StdinLogin {
    async fn login(&self) -> Result<String> {
        println!("Please enter the login code:");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut code = String::new();
        std::io::stdin().read_line(&mut code)?;
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(ErrorKind::HostError("Empty login code".to_string()).into());
        }
        Ok(code)
    }
}

/// Login code source chosen on the command line
#[derive(Debug)]
pub enum CliLogin {
    Fixed(FixedCodeLogin),
    Stdin(StdinLogin),
}

impl HostLogin for CliLogin {
    async fn login(&self) -> Result<String> {
        match self {
            CliLogin::Fixed(login) => login.login().await,
            CliLogin::Stdin(login) => login.login().await,
        }
    }
}

pub type NativeHost<L> = Platform<ReqwestNetwork, L, FileStorage, LogUi>;

/// Build a native host with file-backed storage at `storage_path`.
pub fn native_host<L: HostLogin>(
    config: &ApiConfig,
    login: L,
    storage_path: impl AsRef<Path>,
) -> Result<NativeHost<L>> {
    Ok(Platform::new(
        ReqwestNetwork::new(config)?,
        login,
        FileStorage::open(storage_path)?,
        LogUi,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_flatten_scalars() {
        let pairs = query_pairs(&json!({"page": 2, "q": "rust"})).unwrap();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("q".to_string(), "rust".to_string())));
        assert!(query_pairs(&json!([1, 2])).is_none());
    }

    #[test]
    fn invalid_header_is_parse_error() {
        let options = RequestOptions::new("http://h/x").header("Authorization", "Bearer a\nb");
        let err = ReqwestNetwork::build_headers(&options).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ParseError(_)));
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.path(), path.as_path());
        storage.set("access_token", "A").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("access_token").as_deref(), Some("A"));
        reopened.clear().unwrap();

        let cleared = FileStorage::open(&path).unwrap();
        assert!(cleared.get("access_token").is_none());
    }
}

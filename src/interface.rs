#![allow(async_fn_in_trait)] // 宿主可能是单线程运行时，不要求 Send

use crate::error::Result;
use crate::model::dtos::{RequestOptions, Response};

/// Network primitive of the host platform
pub trait HostNetwork {
    /// Send `options` as-is (`url` is already absolute). Any status is `Ok`.
    async fn request(&self, options: &RequestOptions) -> Result<Response>;
}

/// Login primitive of the host platform
pub trait HostLogin {
    /// Obtain a fresh one-time login code
    async fn login(&self) -> Result<String>;
}

/// Persistent key-value storage of the host platform
pub trait HostStorage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove every stored key
    fn clear(&self) -> Result<()>;
}

/// UI affordances of the host platform
pub trait HostUi {
    fn show_loading(&self, title: &str);

    fn hide_loading(&self);

    fn show_modal(&self, title: &str, content: &str);
}

/// Everything the API client needs from its host
pub trait Host: HostNetwork + HostLogin + HostStorage + HostUi {}

impl<T> Host for T where T: HostNetwork + HostLogin + HostStorage + HostUi {}

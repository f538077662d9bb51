use std::future::Future;

use crate::error::Result;
use crate::interface::{HostLogin, HostNetwork, HostStorage, HostUi};
use crate::model::dtos::{RequestOptions, Response};

/// Composes independent host parts into a single [`crate::interface::Host`].
#[derive(Debug, Clone)]
pub struct Platform<N, L, S, U> {
    pub network: N,
    pub login: L,
    pub storage: S,
    pub ui: U,
}

impl<N, L, S, U> Platform<N, L, S, U> {
    pub fn new(network: N, login: L, storage: S, ui: U) -> Self {
        Self {
            network,
            login,
            storage,
            ui,
        }
    }
}

impl<N: HostNetwork, L, S, U> HostNetwork for Platform<N, L, S, U> {
    async fn request(&self, options: &RequestOptions) -> Result<Response> {
        self.network.request(options).await
    }
}

impl<N, L: HostLogin, S, U> HostLogin for Platform<N, L, S, U> {
    async fn login(&self) -> Result<String> {
        self.login.login().await
    }
}

impl<N, L, S: HostStorage, U> HostStorage for Platform<N, L, S, U> {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set(key, value)
    }

    fn clear(&self) -> Result<()> {
        self.storage.clear()
    }
}

impl<N, L, S, U: HostUi> HostUi for Platform<N, L, S, U> {
    fn show_loading(&self, title: &str) {
        self.ui.show_loading(title)
    }

    fn hide_loading(&self) {
        self.ui.hide_loading()
    }

    fn show_modal(&self, title: &str, content: &str) {
        self.ui.show_modal(title, content)
    }
}

/// Login primitive backed by an async closure
pub struct FnLogin<F>(pub F);

impl<F, Fut> HostLogin for FnLogin<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    async fn login(&self) -> Result<String> {
        (self.0)().await
    }
}

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod interface;
pub mod model;

pub use app::ApiClient;
pub use config::{ApiConfig, TokenPolicy};
pub use error::{Error, ErrorKind, Result};
pub use model::dtos::{Method, RequestOptions, Response};

#[cfg(feature = "no-wasm")]
pub use tokio;

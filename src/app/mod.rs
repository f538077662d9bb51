//! Application module - the authentication-aware API client
//!
//! [`api::ApiClient`] implements request dispatch and the token lifecycle on
//! top of any [`crate::interface::Host`]; [`session::SessionStore`] maps the
//! typed session onto host storage.

pub mod api;
pub mod session;

pub use api::ApiClient;
pub use session::SessionStore;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};
use crate::model::dtos::Response;

/// Cached credential together with its absolute expiry (epoch milliseconds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub expired_at: Option<i64>,
}

impl Session {
    /// A token without a readable expiry is treated as stale.
    pub fn is_stale(&self, now_millis: i64) -> bool {
        match self.expired_at {
            Some(expired_at) => now_millis > expired_at,
            None => true,
        }
    }
}

/// Token body returned by the authorization endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenPayload {
    pub access_token: String,
    pub expires_in: i64,
}

impl TokenPayload {
    pub fn from_response(response: &Response) -> Result<Self> {
        serde_json::from_value(response.data.clone()).map_err(|e| {
            ErrorKind::ParseError(format!(
                "Invalid token payload (status {}): {e}",
                response.status_code
            ))
            .into()
        })
    }

    pub fn into_session(self, now_millis: i64, unit: ExpiryUnit) -> Session {
        Session {
            access_token: self.access_token,
            expired_at: Some(now_millis.saturating_add(unit.to_millis(self.expires_in))),
        }
    }
}

/// Unit the server's `expires_in` is read in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl ExpiryUnit {
    pub fn to_millis(self, expires_in: i64) -> i64 {
        match self {
            ExpiryUnit::Seconds => expires_in.saturating_mul(1000),
            ExpiryUnit::Milliseconds => expires_in,
        }
    }
}

/// Layout of the `Authorization` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BearerStyle {
    /// `Bearer <token>`
    #[default]
    Spaced,
    /// `Bearer<token>`, what older refresh clients sent
    Compact,
}

impl BearerStyle {
    pub fn header_value(self, token: &str) -> String {
        match self {
            BearerStyle::Spaced => format!("Bearer {token}"),
            BearerStyle::Compact => format!("Bearer{token}"),
        }
    }
}

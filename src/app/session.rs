use crate::error::Result;
use crate::interface::HostStorage;
use crate::model::structs::Session;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const EXPIRED_AT_KEY: &str = "access_token_expired_at";

/// Typed view of the session keys in host storage.
///
/// This is the only place that knows the key names, so login and refresh
/// always write the expiry under the same key.
pub struct SessionStore<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: HostStorage + ?Sized> SessionStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Cached token regardless of expiry; empty counts as absent.
    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn load(&self) -> Option<Session> {
        let access_token = self.access_token()?;
        let expired_at = self
            .storage
            .get(EXPIRED_AT_KEY)
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        Some(Session {
            access_token,
            expired_at,
        })
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        if let Some(expired_at) = session.expired_at {
            self.storage.set(EXPIRED_AT_KEY, &expired_at.to_string())?;
        }
        Ok(())
    }

    /// Wipe the whole host storage, not only the session keys.
    pub fn clear_all(&self) -> Result<()> {
        self.storage.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryStorage;

    #[test]
    fn empty_storage_has_no_session() {
        let storage = MemoryStorage::new();
        assert!(SessionStore::new(&storage).load().is_none());
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, "").unwrap();
        storage.set(EXPIRED_AT_KEY, "123").unwrap();
        assert!(SessionStore::new(&storage).load().is_none());
    }

    #[test]
    fn save_then_load() {
        let storage = MemoryStorage::new();
        let sessions = SessionStore::new(&storage);
        let session = Session {
            access_token: "A".to_string(),
            expired_at: Some(1_700_000_000_000),
        };
        sessions.save(&session).unwrap();

        assert_eq!(storage.get(EXPIRED_AT_KEY).as_deref(), Some("1700000000000"));
        assert_eq!(sessions.load(), Some(session));
    }

    #[test]
    fn garbage_expiry_loads_as_none() {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, "A").unwrap();
        storage.set(EXPIRED_AT_KEY, "soon").unwrap();
        let session = SessionStore::new(&storage).load().unwrap();
        assert_eq!(session.expired_at, None);
        assert!(session.is_stale(0));
    }

    #[test]
    fn clear_all_wipes_unrelated_keys() {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, "A").unwrap();
        storage.set("draft", "x").unwrap();
        SessionStore::new(&storage).clear_all().unwrap();
        assert!(storage.is_empty());
    }
}

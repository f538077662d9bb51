use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ErrorKind, Result};
use crate::interface::{HostLogin, HostStorage};

/// Storage that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HostStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}

/// Hands out a single pre-obtained login code; codes are one-time.
#[derive(Debug)]
pub struct FixedCodeLogin {
    code: Mutex<Option<String>>,
}

impl FixedCodeLogin {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Mutex::new(Some(code.into())),
        }
    }
}

impl HostLogin for FixedCodeLogin {
    async fn login(&self) -> Result<String> {
        self.code
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| ErrorKind::HostError("Login code already used".to_string()).into())
    }
}

//! Durable local persistence for the anonymous path.
//!
//! Each store writes one JSON document under a fixed namespace. The
//! server-linked cart handle is never persisted.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::Result;

pub const CART_NAMESPACE: &str = "cart";
pub const WISHLIST_NAMESPACE: &str = "wishlist";

pub trait LocalStore: Send + Sync {
    /// Returns `None` when nothing has been persisted under the namespace.
    fn load(&self, namespace: &str) -> Result<Option<String>>;
    fn save(&self, namespace: &str, payload: &str) -> Result<()>;
    fn remove(&self, namespace: &str) -> Result<()>;
}

/// File-backed store, one `<namespace>.json` per namespace.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

impl LocalStore for JsonFileStore {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(namespace)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, namespace: &str, payload: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(namespace), payload)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        match std::fs::remove_file(self.path(namespace)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(namespace).cloned())
    }

    fn save(&self, namespace: &str, payload: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(namespace.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.remove(namespace);
        Ok(())
    }
}

//! Named peer addresses and their persistence.
//!
//! Entries are kept in memory and written out only when [`AliasRegistry::save`]
//! is called. The on-disk format is a JSON array of
//! `{"Username": .., "Ip": .., "Port": ..}` records.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::common::{PersistenceError, ValidationError};
use crate::config::DEFAULT_ALIAS_FILE;

/// A peer reachable under a human-chosen name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    pub alias: String,
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    /// `host:port` form, suitable for connecting.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.alias, self.host, self.port)
    }
}

/// Split `"192.168.0.1:8080"` into its host and port.
pub fn split_host_port(address: &str) -> Result<(String, u16), ValidationError> {
    let address = address.trim();
    let (host, port) = address
        .split_once(':')
        .ok_or_else(|| ValidationError::Address(address.to_string()))?;
    if host.is_empty() {
        return Err(ValidationError::Address(address.to_string()));
    }
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Port(port.to_string()));
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ValidationError::Port(port.to_string())),
        Ok(port) => Ok((host.to_string(), port)),
    }
}

/// Persisted form of one entry.
#[derive(Debug, Serialize, Deserialize)]
struct AliasRecord {
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "Ip")]
    ip: String,
    #[serde(rename = "Port")]
    port: u16,
}

/// Backing storage for the alias file.
pub trait AliasStore {
    /// Stored contents, or `None` if nothing has been saved yet.
    fn read(&self) -> io::Result<Option<String>>;
    /// Replace the stored contents.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Aliases kept in a file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_FILE)
    }
}

impl AliasStore for FileStore {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }
}

/// In-process store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl AliasStore for MemoryStore {
    fn read(&self) -> io::Result<Option<String>> {
        self.contents
            .lock()
            .map(|c| c.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}

/// Alias to address mapping. Aliases are unique, addresses are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    entries: BTreeMap<String, PeerAddress>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `store`. Anything that cannot be read counts as
    /// an empty registry.
    pub fn load(store: &dyn AliasStore) -> Self {
        let mut registry = Self::new();
        if let Err(e) = registry.merge_from(store) {
            log::warn!("ignoring stored aliases: {}", e);
        }
        registry
    }

    /// Build a registry from `store`, failing when the stored aliases cannot
    /// be read. Use this before saving so an unreadable file is not replaced.
    pub fn try_load(store: &dyn AliasStore) -> Result<Self, PersistenceError> {
        let mut registry = Self::new();
        registry.merge_from(store)?;
        Ok(registry)
    }

    /// Bind `alias` to `address` (`host:port`), replacing any previous binding.
    pub fn add(&mut self, alias: &str, address: &str) -> Result<&PeerAddress, ValidationError> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ValidationError::Alias(alias.to_string()));
        }
        let (host, port) = split_host_port(address)?;
        let peer = PeerAddress {
            alias: alias.to_string(),
            host,
            port,
        };
        if let Some(old) = self.entries.insert(alias.to_string(), peer) {
            log::debug!("alias {} was {}", alias, old.endpoint());
        }
        Ok(&self.entries[alias])
    }

    /// Drop `alias`, returning the entry if there was one.
    pub fn remove(&mut self, alias: &str) -> Option<PeerAddress> {
        self.entries.remove(alias)
    }

    pub fn lookup(&self, alias: &str) -> Option<&PeerAddress> {
        self.entries.get(alias)
    }

    /// Host and port for `alias`; `("", 0)` when it is unknown.
    pub fn host_port(&self, alias: &str) -> (String, u16) {
        self.lookup(alias)
            .map(|peer| (peer.host.clone(), peer.port))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by alias.
    pub fn iter(&self) -> impl Iterator<Item = &PeerAddress> {
        self.entries.values()
    }

    /// Every entry, one `alias (host:port)` line each.
    pub fn listing(&self) -> String {
        self.iter().map(|peer| format!("{}\n", peer)).collect()
    }

    /// The `alias (host:port)` line for a single alias.
    pub fn listing_for(&self, alias: &str) -> Option<String> {
        self.lookup(alias).map(ToString::to_string)
    }

    /// Write every entry to `store`, replacing what was there.
    pub fn save(&self, store: &dyn AliasStore) -> Result<(), PersistenceError> {
        let records: Vec<AliasRecord> = self
            .iter()
            .map(|peer| AliasRecord {
                username: peer.alias.clone(),
                ip: peer.host.clone(),
                port: peer.port,
            })
            .collect();
        let json = serde_json::to_string_pretty(&records).map_err(PersistenceError::Serialize)?;
        store.write(&json)?;
        log::debug!("saved {} aliases", records.len());
        Ok(())
    }

    /// Merge the stored entries into this registry; stored entries win on
    /// collision. Records without an alias, a host or a non-zero port are
    /// skipped. Returns how many were merged. On error nothing is changed.
    pub fn merge_from(&mut self, store: &dyn AliasStore) -> Result<usize, PersistenceError> {
        let Some(contents) = store.read()? else {
            return Ok(0);
        };
        let records: Vec<AliasRecord> =
            serde_json::from_str(&contents).map_err(PersistenceError::Deserialize)?;
        let mut count = 0;
        for record in records {
            let alias = record.username.trim();
            if alias.is_empty() || record.ip.is_empty() || record.port == 0 {
                log::warn!(
                    "skipping stored alias {:?} ({}:{})",
                    record.username,
                    record.ip,
                    record.port
                );
                continue;
            }
            self.entries.insert(
                alias.to_string(),
                PeerAddress {
                    alias: alias.to_string(),
                    host: record.ip,
                    port: record.port,
                },
            );
            count += 1;
        }
        log::debug!("loaded {} aliases", count);
        Ok(count)
    }
}

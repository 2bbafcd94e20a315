//! Registry of locally installed MCP servers, kept in the Claude Desktop config file
//!
//! The server only touches the registry through [`ServerRegistry`], so the file location and
//! format stay out of the protocol layer.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::mcp::server::Capabilities;

const REGISTRY_DIR: &str = "claude-desktop";
const REGISTRY_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub server_type: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot determine the home directory for the registry file")]
    NoHomeDir,
    #[error("registry file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("registry file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait ServerRegistry: Send + Sync {
    fn load(&self) -> Result<RegistryDocument, RegistryError>;

    fn save(&self, document: &RegistryDocument) -> Result<(), RegistryError>;

    fn register(&self, entry: ServerEntry) -> Result<(), RegistryError> {
        let mut document = self.load()?;
        document.upsert(entry);
        self.save(&document)
    }
}

impl RegistryDocument {
    /// Replaces the entry with the same name in place, or appends a new one.
    pub fn upsert(&mut self, entry: ServerEntry) {
        match self
            .servers
            .iter_mut()
            .find(|existing| existing.name == entry.name)
        {
            Some(existing) => *existing = entry,
            None => self.servers.push(entry),
        }
    }

    /// Looks up an entry by server name.
    pub fn get(&self, name: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_path() -> Result<Self, RegistryError> {
        default_registry_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServerRegistry for JsonFileRegistry {
    fn load(&self) -> Result<RegistryDocument, RegistryError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(RegistryDocument::default())
            }
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self, document: &RegistryDocument) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, data)?;
        info!(path = %self.path.display(), servers = document.servers.len(), "registry saved");
        Ok(())
    }
}

/// `%APPDATA%\claude-desktop\config.json` on Windows, `~/.config/claude-desktop/config.json`
/// everywhere else.
pub fn default_registry_path() -> Result<PathBuf, RegistryError> {
    let base = if cfg!(windows) {
        dirs::config_dir()
    } else {
        dirs::home_dir().map(|home| home.join(".config"))
    };

    base.map(|dir| dir.join(REGISTRY_DIR).join(REGISTRY_FILE))
        .ok_or(RegistryError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, port: u16) -> ServerEntry {
        ServerEntry {
            name: name.to_string(),
            server_type: "http".to_string(),
            host: "localhost".to_string(),
            port,
            capabilities: Capabilities::from([("echo".to_string(), true)]),
        }
    }

    #[test]
    fn missing_file_loads_as_empty_document() {
        let dir = tempfile::tempdir().expect("temp dir");
        let registry = JsonFileRegistry::new(dir.path().join("absent.json"));

        assert_eq!(registry.load().expect("load"), RegistryDocument::default());
    }

    #[test]
    fn register_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let registry = JsonFileRegistry::new(dir.path().join("claude-desktop").join("config.json"));

        registry.register(entry("echo", 49200)).expect("register");

        assert!(registry.path().exists());
        let document = registry.load().expect("load");
        assert_eq!(document.servers, vec![entry("echo", 49200)]);
    }

    #[test]
    fn register_upserts_by_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let registry = JsonFileRegistry::new(dir.path().join("config.json"));

        registry.register(entry("alpha", 1)).expect("register alpha");
        registry.register(entry("beta", 2)).expect("register beta");
        registry.register(entry("alpha", 3)).expect("update alpha");

        let document = registry.load().expect("load");
        assert_eq!(document.servers.len(), 2);
        assert_eq!(document.servers[0], entry("alpha", 3));
        assert_eq!(document.get("beta"), Some(&entry("beta", 2)));
    }

    #[test]
    fn file_uses_type_key_and_servers_array() {
        let dir = tempfile::tempdir().expect("temp dir");
        let registry = JsonFileRegistry::new(dir.path().join("config.json"));
        registry.register(entry("echo", 8080)).expect("register");

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(registry.path()).expect("read")).expect("json");

        assert_eq!(raw["servers"][0]["type"], "http");
        assert_eq!(raw["servers"][0]["port"], 8080);
        assert_eq!(raw["servers"][0]["capabilities"]["echo"], true);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").expect("write");

        let err = JsonFileRegistry::new(path).load().expect_err("corrupt json");
        assert!(matches!(err, RegistryError::Json(_)));
    }
}

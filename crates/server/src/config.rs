//! Server configuration: the JSON file named on the command line.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct PersistentStorageContainer {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "serverID")]
    pub server_id: String,
    pub protocol: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub port: u32,
    #[serde(rename = "persistentStorageContainer")]
    pub persistent_storage_container: PersistentStorageContainer,
    pub deletetimeout: i64,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ServerConfig {
    /// Loads a config file holding one or more newline-delimited JSON
    /// objects; the last complete object wins.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = None;
        for value in serde_json::Deserializer::from_str(&text).into_iter::<ServerConfig>() {
            config = Some(value?);
        }
        config.ok_or_else(|| anyhow::anyhow!("config file contained no JSON object"))
    }

    /// `deletetimeout` as a [`chrono::Duration`] for `purge`.
    pub fn purge_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.deletetimeout)
    }

    pub fn bind_addr(&self, port: u32) -> String {
        format!("{}:{port}", self.ip_address)
    }
}

//! Client configuration: the JSON file named on the command line.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "serverID")]
    pub server_id: String,
    pub protocol: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub port: u32,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = None;
        for value in serde_json::Deserializer::from_str(&text).into_iter::<ClientConfig>() {
            config = Some(value?);
        }
        config.ok_or_else(|| anyhow::anyhow!("config file contained no JSON object"))
    }
}

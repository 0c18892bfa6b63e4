//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }

    fn section_keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

//! Asset directory configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, ResourceResult};

/// Where resource files live. Sub-directories are relative to `root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub components: PathBuf,
    pub connectors: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./assets"),
            components: PathBuf::from("components"),
            connectors: PathBuf::from("connectors"),
        }
    }
}

impl AssetConfig {
    /// Default layout below a different asset root.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn component_dir(&self) -> PathBuf {
        self.root.join(&self.components)
    }

    pub fn connector_dir(&self) -> PathBuf {
        self.root.join(&self.connectors)
    }

    pub fn load_yaml(path: &Path) -> ResourceResult<Self> {
        let content = read(path)?;
        serde_yaml::from_str(&content).map_err(|e| config_error(path, e))
    }

    pub fn load_json(path: &Path) -> ResourceResult<Self> {
        let content = read(path)?;
        serde_json::from_str(&content).map_err(|e| config_error(path, e))
    }
}

fn read(path: &Path) -> ResourceResult<String> {
    std::fs::read_to_string(path).map_err(|e| config_error(path, e))
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> ResourceError {
    ResourceError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: AssetConfig = serde_yaml::from_str("root: /srv/assets\n").unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/assets"));
        assert_eq!(config.components, PathBuf::from("components"));
        assert_eq!(config.connector_dir(), PathBuf::from("/srv/assets/connectors"));
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("assets.yaml");
        std::fs::write(&yaml, "root: lib\ncomponents: parts\n").unwrap();
        let json = dir.path().join("assets.json");
        std::fs::write(&json, r#"{"connectors": "wires"}"#).unwrap();

        let from_yaml = AssetConfig::load_yaml(&yaml).unwrap();
        assert_eq!(from_yaml.component_dir(), PathBuf::from("lib/parts"));
        let from_json = AssetConfig::load_json(&json).unwrap();
        assert_eq!(from_json.connectors, PathBuf::from("wires"));
        assert_eq!(from_json.root, AssetConfig::default().root);
    }

    #[test]
    fn unreadable_config_names_the_file() {
        let err = AssetConfig::load_yaml(Path::new("/nonexistent/assets.yaml")).unwrap_err();
        assert!(matches!(err, ResourceError::Config { .. }));
        assert!(err.to_string().contains("assets.yaml"));
    }
}

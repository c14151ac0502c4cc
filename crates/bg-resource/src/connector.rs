//! Connector types: the kind of plug at either end of a wire.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{ResourceCache, ResourceLoader};
use crate::error::LoadError;
use crate::purchase::PurchaseData;

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorType {
    id: String,
    name: String,
    purchase: Option<PurchaseData>,
}

impl ConnectorType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            purchase: None,
        }
    }

    pub fn with_purchase(mut self, purchase: PurchaseData) -> Self {
        self.purchase = Some(purchase);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purchase(&self) -> Option<&PurchaseData> {
        self.purchase.as_ref()
    }
}

#[derive(Deserialize)]
struct ConnectorFile {
    name: String,
    #[serde(default)]
    purchase: Option<PurchaseData>,
}

#[derive(Clone, Debug)]
pub struct ConnectorLoader {
    dir: PathBuf,
}

impl ConnectorLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for ConnectorLoader {
    fn default() -> Self {
        Self::new("connectors")
    }
}

impl ResourceLoader for ConnectorLoader {
    type Resource = ConnectorType;

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(
        &self,
        id: &str,
        raw: &Value,
        _cache: &ResourceCache,
    ) -> Result<ConnectorType, LoadError> {
        let file = ConnectorFile::deserialize(raw)?;
        Ok(ConnectorType {
            id: id.to_string(),
            name: file.name,
            purchase: file.purchase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_name_and_purchase() {
        let cache = ResourceCache::new("unused");
        let raw = json!({"name": "JST-PH 2 pin", "purchase": [{"price": "$0.10", "url": "u"}]});
        let jst = ConnectorLoader::default().load("jst.ph2", &raw, &cache).unwrap();
        assert_eq!(jst.id(), "jst.ph2");
        assert_eq!(jst.name(), "JST-PH 2 pin");
        assert!(jst.purchase().is_some());

        let bare = ConnectorLoader::default()
            .load("bare", &json!({"name": "Bare"}), &cache)
            .unwrap();
        assert!(bare.purchase().is_none());
    }
}

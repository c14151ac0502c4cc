//! Component types: the shape, ports and purchase data shared by every
//! placed instance of a part.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bg_core::units::QuantityText;
use bg_core::{Footprint, Mass, Point, SlotIndex, StableIndexList};
use serde::Deserialize;
use serde_json::Value;

use crate::cache::{ResourceCache, ResourceLoader};
use crate::error::LoadError;
use crate::purchase::PurchaseData;

/// Index of a port within its component type. Stable for the type's lifetime.
pub type PortIdx = SlotIndex;

/// A named connection point, positioned relative to the component origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    id: String,
    name: String,
    offset: Point,
}

impl Port {
    pub fn new(id: impl Into<String>, name: impl Into<String>, offset: Point) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            offset,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> Point {
        self.offset
    }
}

/// An immutable component definition loaded from `components/<id path>.json`.
#[derive(Clone, Debug)]
pub struct ComponentType {
    id: String,
    name: String,
    footprint: Footprint,
    ports: StableIndexList<Port>,
    mass: Option<Mass>,
    purchase: Option<PurchaseData>,
}

impl ComponentType {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        footprint: Footprint,
        ports: impl IntoIterator<Item = Port>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            footprint,
            ports: ports.into_iter().collect(),
            mass: None,
            purchase: None,
        }
    }

    pub fn with_mass(mut self, mass: Mass) -> Self {
        self.mass = Some(mass);
        self
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

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn mass(&self) -> Option<Mass> {
        self.mass
    }

    pub fn purchase(&self) -> Option<&PurchaseData> {
        self.purchase.as_ref()
    }

    pub fn ports(&self) -> &StableIndexList<Port> {
        &self.ports
    }

    pub fn port(&self, idx: PortIdx) -> Option<&Port> {
        self.ports.get(idx)
    }

    pub fn port_index(&self, port_id: &str) -> Option<PortIdx> {
        self.ports.position(|p| p.id == port_id)
    }

    pub fn port_by_id(&self, port_id: &str) -> Option<(PortIdx, &Port)> {
        self.ports.iter().find(|(_, p)| p.id == port_id)
    }
}

#[derive(Deserialize)]
struct ComponentFile {
    name: String,
    footprint: Footprint,
    ports: BTreeMap<String, PortFile>,
    #[serde(default)]
    mass: Option<QuantityText>,
    #[serde(default)]
    purchase: Option<PurchaseData>,
}

#[derive(Deserialize)]
struct PortFile {
    name: String,
    pos: Point,
}

/// Builds [`ComponentType`]s. Ports are indexed in port-id order.
#[derive(Clone, Debug)]
pub struct ComponentLoader {
    dir: PathBuf,
}

impl ComponentLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for ComponentLoader {
    fn default() -> Self {
        Self::new("components")
    }
}

impl ResourceLoader for ComponentLoader {
    type Resource = ComponentType;

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(
        &self,
        id: &str,
        raw: &Value,
        _cache: &ResourceCache,
    ) -> Result<ComponentType, LoadError> {
        let file = ComponentFile::deserialize(raw)?;
        let mass = file.mass.as_ref().map(QuantityText::to_mass).transpose()?;
        let ports = file
            .ports
            .into_iter()
            .map(|(port_id, port)| Port::new(port_id, port.name, port.pos));

        Ok(ComponentType {
            mass,
            purchase: file.purchase,
            ..ComponentType::new(id, file.name, file.footprint, ports)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::{Tolerances, units};
    use serde_json::json;

    fn load(raw: Value) -> Result<ComponentType, LoadError> {
        ComponentLoader::default().load("passive.led", &raw, &ResourceCache::new("unused"))
    }

    #[test]
    fn loads_ports_mass_and_purchase() {
        let led = load(json!({
            "name": "LED",
            "footprint": [["0mm", "0mm"], ["3mm", "0mm"], ["3mm", "2mm"]],
            "ports": {
                "k": {"name": "Cathode", "pos": ["3mm", "1mm"]},
                "a": {"name": "Anode", "pos": ["0mm", "1mm"]}
            },
            "mass": "0.2g",
            "purchase": [{"price": "3c", "url": "https://example.com/led"}]
        }))
        .unwrap();

        assert_eq!(led.id(), "passive.led");
        assert_eq!(led.name(), "LED");
        assert_eq!(led.ports().len(), 2);

        let anode = led.port_index("a").unwrap();
        assert_eq!(anode.index(), 0);
        assert_eq!(led.port(anode).unwrap().name(), "Anode");
        let (cathode, port) = led.port_by_id("k").unwrap();
        assert_eq!(cathode.index(), 1);
        assert!(port.offset().approx_eq(&Point::mm(3.0, 1.0), Tolerances::default()));

        assert!(bg_core::nearly_equal(
            units::mass_g(led.mass().unwrap()),
            0.2,
            Tolerances::default()
        ));
        assert_eq!(led.purchase().unwrap().items().len(), 1);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let plain = load(json!({"name": "Pad", "footprint": [], "ports": {}})).unwrap();
        assert!(plain.mass().is_none());
        assert!(plain.purchase().is_none());
        assert!(plain.port_index("x").is_none());
    }

    #[test]
    fn missing_or_bad_fields_fail() {
        assert!(matches!(
            load(json!({"name": "NoPorts", "footprint": []})),
            Err(LoadError::Json(_))
        ));
        assert!(matches!(
            load(json!({"name": "Heavy", "footprint": [], "ports": {}, "mass": "2 stone"})),
            Err(LoadError::Value(_))
        ));
    }
}

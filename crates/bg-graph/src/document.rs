//! The persisted board document.
//!
//! ```json
//! {
//!   "nodes": {
//!     "r1": {
//!       "name": "R1",
//!       "type": "passive.resistor_0805",
//!       "pos": ["10mm", "5mm"],
//!       "conns": [{"port": "p1", "edge": "w1", "side": "LEFT"}]
//!     }
//!   },
//!   "edges": {
//!     "w1": {
//!       "conns": [
//!         {"connector": "dupont", "node": "r1", "port": "p1"},
//!         {"connector": "dupont", "pos": ["40mm", "5mm"]}
//!       ]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use bg_core::Point;
use serde::{Deserialize, Serialize};

use crate::edge::Side;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeDef>,
    #[serde(default)]
    pub edges: BTreeMap<String, EdgeDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    /// Component resource id.
    #[serde(rename = "type")]
    pub type_id: String,
    pub pos: Point,
    #[serde(default)]
    pub conns: Vec<PortConnDef>,
}

/// A node port occupied by one end of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnDef {
    pub port: String,
    pub edge: String,
    pub side: Side,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    pub conns: Vec<EndpointDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
}

/// One edge end as written in the file. Valid shapes are
/// `{connector, node, port}` and `{connector, pos}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointDef {
    pub connector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Point>,
}

impl EndpointDef {
    pub fn attached(
        connector: impl Into<String>,
        node: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            connector: connector.into(),
            node: Some(node.into()),
            port: Some(port.into()),
            pos: None,
        }
    }

    pub fn floating(connector: impl Into<String>, pos: Point) -> Self {
        Self {
            connector: connector.into(),
            node: None,
            port: None,
            pos: Some(pos),
        }
    }
}

impl BoardDocument {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

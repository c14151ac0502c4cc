//! bg-graph: the board graph.
//!
//! Provides:
//! - `ComponentNode`: a placed instance of a component type
//! - `WireEdge` and its two `Connection` ends, each attached to a node port
//!   or floating at a position
//! - `BoardGraph`: owns nodes and edges, keeps their cross references
//!   consistent, and loads/saves the board document
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use bg_graph::BoardGraph;
//! use bg_resource::{AssetConfig, ResourceCache};
//!
//! let cache = Rc::new(ResourceCache::with_assets(&AssetConfig::default()));
//! let board = BoardGraph::open("board.json", cache).unwrap();
//! board.validate().unwrap();
//! println!("{} nodes, {} edges", board.node_count(), board.edge_count());
//! ```

pub mod document;
pub mod edge;
pub mod error;
pub mod graph;
pub mod ids;
mod load;
pub mod node;
mod persist;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use document::{BoardDocument, EdgeDef, EndpointDef, NodeDef, PortConnDef};
pub use edge::{Connection, EdgeConnection, Endpoint, Side, WireEdge};
pub use error::{GraphError, GraphResult, StructuralError};
pub use graph::BoardGraph;
pub use ids::{EdgeId, NodeId};
pub use node::ComponentNode;

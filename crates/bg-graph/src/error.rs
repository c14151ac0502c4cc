//! Graph-specific error types.

use std::path::PathBuf;

use bg_resource::ResourceError;
use thiserror::Error;

use crate::edge::Side;

pub type GraphResult<T> = Result<T, GraphError>;

/// A board that references something missing or is shaped wrongly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Node '{node}' does not exist")]
    UnknownNode { node: String },

    #[error("Edge '{edge}' does not exist")]
    UnknownEdge { edge: String },

    /// The port is not defined by the node's component type.
    #[error("Node '{node}' has no port '{port}'")]
    UnknownPort { node: String, port: String },

    #[error("Edge has {count} connections (expected 2)")]
    EdgeArity { count: usize },

    /// An edge end that is neither `{connector, node, port}` nor `{connector, pos}`.
    #[error("{side} connection must name either a node and port or a position")]
    BadEndpoint { side: Side },

    #[error("Port '{port}' of node '{node}' is already connected")]
    PortConflict { node: String, port: String },

    /// A node's port map and an edge end disagree about a connection.
    #[error("{side} end of edge '{edge}' and node '{node}' do not agree on their connection")]
    DanglingConnection {
        edge: String,
        side: Side,
        node: String,
    },
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("While loading node '{id}': {source}")]
    Node {
        id: String,
        #[source]
        source: Box<GraphError>,
    },

    #[error("While loading edge '{id}': {source}")]
    Edge {
        id: String,
        #[source]
        source: Box<GraphError>,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Board has no file path")]
    NoPath,
}

impl GraphError {
    /// The structural problem behind this error, looking through node/edge context.
    pub fn structural(&self) -> Option<&StructuralError> {
        match self {
            GraphError::Structural(err) => Some(err),
            GraphError::Node { source, .. } | GraphError::Edge { source, .. } => {
                source.structural()
            }
            _ => None,
        }
    }

    /// The resource failure behind this error, looking through node/edge context.
    pub fn resource(&self) -> Option<&ResourceError> {
        match self {
            GraphError::Resource(err) => Some(err),
            GraphError::Node { source, .. } | GraphError::Edge { source, .. } => source.resource(),
            _ => None,
        }
    }

    pub(crate) fn in_node(self, id: &str) -> Self {
        GraphError::Node {
            id: id.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_edge(self, id: &str) -> Self {
        GraphError::Edge {
            id: id.to_string(),
            source: Box::new(self),
        }
    }
}

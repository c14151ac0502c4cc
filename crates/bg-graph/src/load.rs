//! Rebuilding a graph from a [`BoardDocument`].
//!
//! Nodes are loaded first, then edges. A node records the edge ends its file
//! entry declares by id; an edge resolves its attached ends against nodes
//! that already exist, loading a node from the document on demand. Once every
//! entry is in place the links are validated as a whole.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use bg_resource::{ComponentType, ConnectorType, PortIdx, ResourceCache};
use tracing::{debug, warn};

use crate::document::{BoardDocument, EdgeDef, EndpointDef, NodeDef, PortConnDef};
use crate::edge::{Connection, EdgeConnection, Endpoint, Side, WireEdge};
use crate::error::{GraphResult, StructuralError};
use crate::graph::BoardGraph;
use crate::ids::{EdgeId, NodeId};
use crate::node::ComponentNode;

/// Ids whose construction is in progress, standing in for the entries
/// until they are complete.
#[derive(Default)]
struct Pending {
    nodes: BTreeSet<String>,
    edges: BTreeSet<String>,
}

impl BoardGraph {
    /// Load every node and edge of `doc` into this graph.
    ///
    /// Entries whose ids already exist are left as they are. On any failure
    /// the graph is restored to its state before the call.
    pub fn load_document(&mut self, doc: &BoardDocument) -> GraphResult<()> {
        let nodes = self.nodes.clone();
        let edges = self.edges.clone();

        let result = self.load_all(doc);
        if let Err(err) = &result {
            warn!("board load failed, rolling back: {err}");
            self.nodes = nodes;
            self.edges = edges;
        }
        result
    }

    fn load_all(&mut self, doc: &BoardDocument) -> GraphResult<()> {
        let mut pending = Pending::default();
        for id in doc.nodes.keys() {
            self.load_node(id, doc, &mut pending)?;
        }
        for id in doc.edges.keys() {
            self.load_edge(id, doc, &mut pending)?;
        }
        self.validate()?;
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "board loaded"
        );
        Ok(())
    }

    fn load_node(&mut self, id: &str, doc: &BoardDocument, pending: &mut Pending) -> GraphResult<()> {
        if self.nodes.contains_key(id) || pending.nodes.contains(id) {
            return Ok(());
        }
        let def = doc
            .nodes
            .get(id)
            .ok_or_else(|| StructuralError::UnknownNode { node: id.into() })?;

        pending.nodes.insert(id.to_string());
        let built = self.build_node(id, def, doc);
        pending.nodes.remove(id);

        let node = built.map_err(|err| err.in_node(id))?;
        self.nodes.insert(node.id().clone(), node);
        Ok(())
    }

    fn build_node(&self, id: &str, def: &NodeDef, doc: &BoardDocument) -> GraphResult<ComponentNode> {
        let ty = self.cache().get::<ComponentType>(&def.type_id)?;
        let mut node = ComponentNode::new(NodeId::from(id), def.name.clone(), ty, def.pos);

        for conn in &def.conns {
            let port = node
                .ty()
                .port_index(&conn.port)
                .ok_or_else(|| StructuralError::UnknownPort {
                    node: id.into(),
                    port: conn.port.clone(),
                })?;
            if !self.edges.contains_key(conn.edge.as_str()) && !doc.edges.contains_key(&conn.edge) {
                return Err(StructuralError::UnknownEdge {
                    edge: conn.edge.clone(),
                }
                .into());
            }
            if node.connection(port).is_some() {
                return Err(StructuralError::PortConflict {
                    node: id.into(),
                    port: conn.port.clone(),
                }
                .into());
            }
            node.edges_mut().insert(
                port,
                EdgeConnection {
                    edge: EdgeId::from(conn.edge.as_str()),
                    side: conn.side,
                },
            );
        }
        Ok(node)
    }

    fn load_edge(&mut self, id: &str, doc: &BoardDocument, pending: &mut Pending) -> GraphResult<()> {
        if self.edges.contains_key(id) || pending.edges.contains(id) {
            return Ok(());
        }
        let def = doc
            .edges
            .get(id)
            .ok_or_else(|| StructuralError::UnknownEdge { edge: id.into() })?;

        pending.edges.insert(id.to_string());
        let built = self.build_edge(id, def, doc, pending);
        pending.edges.remove(id);
        let (edge, plugs) = built.map_err(|err| err.in_edge(id))?;

        for (node, port, side) in plugs {
            if let Some(node) = self.nodes.get_mut(&node) {
                node.edges_mut().insert(
                    port,
                    EdgeConnection {
                        edge: edge.id().clone(),
                        side,
                    },
                );
            }
        }
        self.edges.insert(edge.id().clone(), edge);
        Ok(())
    }

    /// Build an edge and the port-map entries it needs, without touching any
    /// node, so a failure leaves nothing half-connected.
    fn build_edge(
        &mut self,
        id: &str,
        def: &EdgeDef,
        doc: &BoardDocument,
        pending: &mut Pending,
    ) -> GraphResult<(WireEdge, Vec<(NodeId, PortIdx, Side)>)> {
        let [left, right] = def.conns.as_slice() else {
            return Err(StructuralError::EdgeArity {
                count: def.conns.len(),
            }
            .into());
        };

        let left = self.resolve_end(id, Side::Left, left, doc, pending)?;
        let right = self.resolve_end(id, Side::Right, right, doc, pending)?;
        let mut edge = WireEdge::new(EdgeId::from(id), left, right);
        edge.set_points(def.points.clone());

        let mut plugs: Vec<(NodeId, PortIdx, Side)> = Vec::new();
        for (side, conn) in edge.conns() {
            let Endpoint::Attached { node: node_id, port } = conn.endpoint() else {
                continue;
            };
            let node = self.nodes.get(node_id);
            let taken_by_other_end = plugs.iter().any(|(n, p, _)| n == node_id && p == port);
            let occupied_elsewhere = node
                .and_then(|n| n.connection(*port))
                .is_some_and(|c| c.edge != id || c.side != side);
            if taken_by_other_end || occupied_elsewhere {
                let port_name = node
                    .and_then(|n| n.ty().port(*port))
                    .map_or_else(|| port.to_string(), |p| p.id().to_string());
                return Err(StructuralError::PortConflict {
                    node: node_id.to_string(),
                    port: port_name,
                }
                .into());
            }
            plugs.push((node_id.clone(), *port, side));
        }
        Ok((edge, plugs))
    }

    fn resolve_end(
        &mut self,
        edge: &str,
        side: Side,
        end: &EndpointDef,
        doc: &BoardDocument,
        pending: &mut Pending,
    ) -> GraphResult<Connection> {
        let connector = self.cache().get::<ConnectorType>(&end.connector)?;
        match (&end.node, &end.port, &end.pos) {
            (Some(node_id), Some(port_id), None) => {
                if !self.nodes.contains_key(node_id.as_str()) {
                    if !doc.nodes.contains_key(node_id) {
                        return Err(StructuralError::UnknownNode {
                            node: node_id.clone(),
                        }
                        .into());
                    }
                    debug!(edge, node = %node_id, "loading node referenced by edge");
                    self.load_node(node_id, doc, pending)?;
                }
                let node = self.nodes.get(node_id.as_str()).ok_or_else(|| {
                    StructuralError::UnknownNode {
                        node: node_id.clone(),
                    }
                })?;
                let port = node.ty().port_index(port_id).ok_or_else(|| {
                    StructuralError::UnknownPort {
                        node: node_id.clone(),
                        port: port_id.clone(),
                    }
                })?;
                Ok(Connection::attached(connector, node.id().clone(), port))
            }
            (None, None, Some(pos)) => Ok(Connection::floating(connector, *pos)),
            _ => Err(StructuralError::BadEndpoint { side }.into()),
        }
    }

    /// Build a graph from a document.
    pub fn from_document(doc: &BoardDocument, cache: Rc<ResourceCache>) -> GraphResult<Self> {
        let mut graph = BoardGraph::new(cache);
        graph.load_document(doc)?;
        Ok(graph)
    }

    /// The document this graph saves as.
    pub fn to_document(&self) -> GraphResult<BoardDocument> {
        let mut nodes = BTreeMap::new();
        for node in self.nodes.values() {
            let mut conns = Vec::new();
            for (port, conn) in node.connections() {
                let port = node.ty().port(port).ok_or_else(|| StructuralError::UnknownPort {
                    node: node.id().to_string(),
                    port: port.to_string(),
                })?;
                conns.push(PortConnDef {
                    port: port.id().to_string(),
                    edge: conn.edge.to_string(),
                    side: conn.side,
                });
            }
            nodes.insert(
                node.id().to_string(),
                NodeDef {
                    name: node.name().to_string(),
                    type_id: node.ty().id().to_string(),
                    pos: node.pos(),
                    conns,
                },
            );
        }

        let mut edges = BTreeMap::new();
        for edge in self.edges.values() {
            let mut conns = Vec::with_capacity(2);
            for (side, conn) in edge.conns() {
                let connector = conn.connector().id();
                let def = match (conn.node(), conn.port(self)) {
                    (Some(node), Some((_, port))) => {
                        EndpointDef::attached(connector, node.as_str(), port.id())
                    }
                    (Some(node), None) => {
                        return Err(StructuralError::DanglingConnection {
                            edge: edge.id().to_string(),
                            side,
                            node: node.to_string(),
                        }
                        .into());
                    }
                    (None, _) => match conn.position(self) {
                        Some(pos) => EndpointDef::floating(connector, pos),
                        None => return Err(StructuralError::BadEndpoint { side }.into()),
                    },
                };
                conns.push(def);
            }
            edges.insert(
                edge.id().to_string(),
                EdgeDef {
                    conns,
                    points: edge.points().to_vec(),
                },
            );
        }

        Ok(BoardDocument { nodes, edges })
    }
}

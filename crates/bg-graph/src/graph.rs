//! The board graph: owns nodes and edges and keeps their cross references
//! consistent.
//!
//! Nodes and edges refer to each other by id only. A node's port map names
//! the edge end plugged into each port; an attached edge end names the node
//! and port it is plugged into. Every mutation below updates both sides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bg_core::Point;
use bg_resource::{ComponentType, ConnectorType, PortIdx, ResourceCache};
use tracing::{debug, warn};

use crate::edge::{Connection, EdgeConnection, Endpoint, Side, WireEdge};
use crate::error::{GraphResult, StructuralError};
use crate::ids::{EdgeId, NodeId};
use crate::node::ComponentNode;
use crate::validate;

pub struct BoardGraph {
    cache: Rc<ResourceCache>,
    path: Option<PathBuf>,
    pub(crate) nodes: BTreeMap<NodeId, ComponentNode>,
    pub(crate) edges: BTreeMap<EdgeId, WireEdge>,
}

impl BoardGraph {
    /// An empty board with no file path.
    pub fn new(cache: Rc<ResourceCache>) -> Self {
        Self {
            cache,
            path: None,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    pub fn cache(&self) -> &Rc<ResourceCache> {
        &self.cache
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn get_node(&self, id: &str) -> Option<&ComponentNode> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&WireEdge> {
        self.edges.get(id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values()
    }

    /// Edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = &WireEdge> {
        self.edges.values()
    }

    /// Place a new, unconnected component under a generated id.
    pub fn component(
        &mut self,
        ty: Rc<ComponentType>,
        name: impl Into<String>,
        pos: Point,
    ) -> NodeId {
        let id = NodeId::generate();
        debug!(node = %id, ty = ty.id(), "placing component");
        self.nodes
            .insert(id.clone(), ComponentNode::new(id.clone(), name, ty, pos));
        id
    }

    /// Place a new, unconnected component under a caller-chosen id.
    ///
    /// Returns `None` without touching the board if the id is already taken.
    pub fn component_with_id(
        &mut self,
        id: impl Into<NodeId>,
        ty: Rc<ComponentType>,
        name: impl Into<String>,
        pos: Point,
    ) -> Option<NodeId> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            warn!(node = %id, "a node with this id already exists");
            return None;
        }
        debug!(node = %id, ty = ty.id(), "placing component");
        self.nodes
            .insert(id.clone(), ComponentNode::new(id.clone(), name, ty, pos));
        Some(id)
    }

    /// Like [`component`](Self::component), resolving the type through the cache.
    pub fn component_by_id(
        &mut self,
        type_id: &str,
        name: impl Into<String>,
        pos: Point,
    ) -> GraphResult<NodeId> {
        let ty = self.cache.get::<ComponentType>(type_id)?;
        Ok(self.component(ty, name, pos))
    }

    /// Add a new wire with both ends floating.
    pub fn wire(&mut self, connector: Rc<ConnectorType>, left: Point, right: Point) -> EdgeId {
        let id = EdgeId::generate();
        let edge = WireEdge::new(
            id.clone(),
            Connection::floating(connector.clone(), left),
            Connection::floating(connector, right),
        );
        self.edges.insert(id.clone(), edge);
        id
    }

    /// Plug the `side` end of `edge` into `port` of `node`.
    ///
    /// An occupied port is only taken over with `force`, which first detaches
    /// whatever was plugged in. If the edge end was attached elsewhere it is
    /// detached from there. Returns `None`, leaving the graph untouched, when
    /// the node, edge or port does not exist, the port is occupied, or an end
    /// that would have to be detached points at a node or port that is gone.
    pub fn connect_port(
        &mut self,
        node: &str,
        port: PortIdx,
        edge: &str,
        side: Side,
        force: bool,
    ) -> Option<&EdgeConnection> {
        let Some(target) = self.nodes.get(node) else {
            warn!(node, "cannot connect to a node that does not exist");
            return None;
        };
        if target.ty().port(port).is_none() {
            warn!(node, %port, "cannot connect to a port the node does not have");
            return None;
        }
        if !self.edges.contains_key(edge) {
            warn!(edge, "cannot connect an edge that does not exist");
            return None;
        }

        let wanted = EdgeConnection {
            edge: EdgeId::from(edge),
            side,
        };
        if let Some(existing) = target.connection(port).cloned() {
            if existing == wanted {
                return self.nodes.get(node)?.connection(port);
            }
            if !force {
                warn!(node, %port, occupied_by = %existing.edge, "port already connected");
                return None;
            }
            if !self.can_detach(existing.edge.as_str(), existing.side) {
                warn!(node, %port, occupied_by = %existing.edge, "occupying end cannot be detached");
                return None;
            }
        }
        if !self.can_detach(edge, side) {
            warn!(edge, %side, "edge end cannot be detached from its old port");
            return None;
        }

        if let Some(existing) = self.nodes.get(node)?.connection(port).cloned() {
            self.detach(existing.edge.as_str(), existing.side).ok()?;
        }
        if self.edges.get(edge)?.conn(side).is_attached() {
            self.detach(edge, side).ok()?;
        }

        let node_id = self.nodes.get(node)?.id().clone();
        self.edges
            .get_mut(edge)?
            .conn_mut(side)
            .set_endpoint(Endpoint::Attached {
                node: node_id,
                port,
            });
        let target = self.nodes.get_mut(node)?;
        target.edges_mut().insert(port, wanted);
        target.connection(port)
    }

    /// Whether [`detach`](Self::detach) would succeed for this end.
    fn can_detach(&self, edge: &str, side: Side) -> bool {
        let Some(wire) = self.edges.get(edge) else {
            return false;
        };
        match wire.conn(side).endpoint() {
            Endpoint::Floating { .. } => true,
            Endpoint::Attached { node, port } => self
                .nodes
                .get(node)
                .is_some_and(|n| n.port_position(*port).is_some()),
        }
    }

    /// Unplug the `side` end of `edge`, leaving it floating where the port was.
    ///
    /// Returns the end's position. Detaching a floating end changes nothing.
    pub fn detach(&mut self, edge: &str, side: Side) -> GraphResult<Point> {
        let wire = self
            .edges
            .get(edge)
            .ok_or_else(|| StructuralError::UnknownEdge { edge: edge.into() })?;
        let (node_id, port) = match wire.conn(side).endpoint() {
            Endpoint::Floating { pos } => return Ok(*pos),
            Endpoint::Attached { node, port } => (node.clone(), *port),
        };

        let dangling = || StructuralError::DanglingConnection {
            edge: edge.into(),
            side,
            node: node_id.to_string(),
        };
        let node = self.nodes.get_mut(&node_id).ok_or_else(dangling)?;
        let pos = node.port_position(port).ok_or_else(dangling)?;
        let plugged_here = node
            .connection(port)
            .is_some_and(|c| c.edge == edge && c.side == side);
        if plugged_here {
            node.edges_mut().remove(&port);
        }

        if let Some(wire) = self.edges.get_mut(edge) {
            wire.conn_mut(side).set_endpoint(Endpoint::Floating { pos });
        }
        debug!(edge, %side, node = %node_id, "detached edge end");
        Ok(pos)
    }

    /// Remove a node. Edge ends plugged into it are left floating at the
    /// positions of the ports they were plugged into.
    pub fn remove_node(&mut self, id: &str) -> Option<ComponentNode> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        let plugged: Vec<(EdgeId, Side)> = self
            .edges
            .values()
            .flat_map(|wire| {
                wire.conns()
                    .filter(|(_, conn)| conn.node().is_some_and(|n| n == id))
                    .map(|(side, _)| (wire.id().clone(), side))
            })
            .collect();
        for (edge, side) in plugged {
            if let Err(err) = self.detach(edge.as_str(), side) {
                warn!(node = id, %edge, "could not detach edge from removed node: {err}");
            }
        }
        self.nodes.remove(id)
    }

    /// Remove an edge and clear the ports it was plugged into.
    pub fn remove_edge(&mut self, id: &str) -> Option<WireEdge> {
        let wire = self.edges.remove(id)?;
        for (side, conn) in wire.conns() {
            if let Endpoint::Attached { node, port } = conn.endpoint() {
                if let Some(node) = self.nodes.get_mut(node) {
                    let plugged_here = node
                        .connection(*port)
                        .is_some_and(|c| c.edge == id && c.side == side);
                    if plugged_here {
                        node.edges_mut().remove(port);
                    }
                }
            }
        }
        Some(wire)
    }

    /// Move a node. Attached edge ends follow it.
    pub fn move_node(&mut self, id: &str, pos: Point) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| StructuralError::UnknownNode { node: id.into() })?;
        node.set_pos(pos);
        Ok(())
    }

    /// Replace the waypoints of an edge.
    pub fn set_points(&mut self, edge: &str, points: Vec<Point>) -> GraphResult<()> {
        let wire = self
            .edges
            .get_mut(edge)
            .ok_or_else(|| StructuralError::UnknownEdge { edge: edge.into() })?;
        wire.set_points(points);
        Ok(())
    }

    /// Check that every port-map entry and every attached edge end agree.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_links(&self.nodes, &self.edges)?;
        Ok(())
    }
}

impl std::fmt::Debug for BoardGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardGraph")
            .field("path", &self.path)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::{Footprint, Tolerances};
    use bg_resource::Port;

    fn resistor() -> Rc<ComponentType> {
        Rc::new(ComponentType::new(
            "passive.resistor",
            "Resistor",
            Footprint::new(vec![Point::mm(0.0, 0.0), Point::mm(4.0, 2.0)]),
            [
                Port::new("p1", "Pin 1", Point::mm(0.0, 1.0)),
                Port::new("p2", "Pin 2", Point::mm(4.0, 1.0)),
            ],
        ))
    }

    fn dupont() -> Rc<ConnectorType> {
        Rc::new(ConnectorType::new("dupont", "Dupont"))
    }

    fn board() -> BoardGraph {
        BoardGraph::new(Rc::new(ResourceCache::new("unused")))
    }

    fn p1() -> PortIdx {
        PortIdx::from_index(0)
    }

    #[test]
    fn connect_then_detach_floats_at_port() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(10.0, 0.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(50.0, 0.0));
        let p2 = g.get_node(r.as_str()).unwrap().ty().port_index("p2").unwrap();

        let conn = g.connect_port(r.as_str(), p2, w.as_str(), Side::Left, false).unwrap();
        assert_eq!(conn.edge, w);
        assert!(g.get_edge(w.as_str()).unwrap().conn(Side::Left).is_attached());
        g.validate().unwrap();

        let pos = g.detach(w.as_str(), Side::Left).unwrap();
        assert!(pos.approx_eq(&Point::mm(14.0, 1.0), Tolerances::default()));
        assert!(g.get_node(r.as_str()).unwrap().connection(p2).is_none());

        let again = g.detach(w.as_str(), Side::Left).unwrap();
        assert_eq!(again, pos);
        g.validate().unwrap();
    }

    #[test]
    fn occupied_port_needs_force() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(0.0, 0.0));
        let a = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        let b = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));

        assert!(g.connect_port(r.as_str(), p1(), a.as_str(), Side::Right, false).is_some());
        assert!(g.connect_port(r.as_str(), p1(), b.as_str(), Side::Left, false).is_none());
        assert!(g.get_edge(b.as_str()).unwrap().conn(Side::Left).is_floating());

        let taken = g.connect_port(r.as_str(), p1(), b.as_str(), Side::Left, true).unwrap();
        assert_eq!(taken.edge, b);
        assert!(g.get_edge(a.as_str()).unwrap().conn(Side::Right).is_floating());
        g.validate().unwrap();
    }

    #[test]
    fn reconnecting_an_end_moves_it() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(0.0, 0.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        let p2 = PortIdx::from_index(1);

        g.connect_port(r.as_str(), p1(), w.as_str(), Side::Left, false).unwrap();
        g.connect_port(r.as_str(), p2, w.as_str(), Side::Left, false).unwrap();

        let node = g.get_node(r.as_str()).unwrap();
        assert!(node.connection(p1()).is_none());
        assert!(node.connection(p2).is_some());
        g.validate().unwrap();
    }

    #[test]
    fn caller_chosen_ids_are_unique() {
        let mut g = board();
        let r = g.component_with_id("r1", resistor(), "R1", Point::mm(1.0, 2.0)).unwrap();
        assert_eq!(r, "r1");
        assert_eq!(g.get_node("r1").unwrap().name(), "R1");

        assert!(g.component_with_id("r1", resistor(), "R2", Point::origin()).is_none());
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.get_node("r1").unwrap().name(), "R1");
        assert_eq!(g.get_node("r1").unwrap().pos(), Point::mm(1.0, 2.0));
    }

    #[test]
    fn refused_forced_connect_changes_nothing() {
        let mut g = board();
        let r = g.component_with_id("r1", resistor(), "R1", Point::mm(0.0, 0.0)).unwrap();
        let a = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        let b = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        g.connect_port(r.as_str(), p1(), a.as_str(), Side::Left, false).unwrap();

        // b's left end claims a node that is no longer on the board.
        g.edges
            .get_mut(b.as_str())
            .unwrap()
            .conn_mut(Side::Left)
            .set_endpoint(Endpoint::Attached {
                node: NodeId::from("ghost"),
                port: p1(),
            });

        assert!(g.connect_port(r.as_str(), p1(), b.as_str(), Side::Left, true).is_none());
        let held = g.get_node(r.as_str()).unwrap().connection(p1()).unwrap();
        assert_eq!(held.edge, a);
        assert!(g.get_edge(a.as_str()).unwrap().conn(Side::Left).is_attached());
        assert_eq!(g.get_edge(b.as_str()).unwrap().conn(Side::Left).node().map(NodeId::as_str), Some("ghost"));
    }

    #[test]
    fn connect_to_missing_things_is_soft() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(0.0, 0.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        assert!(g.connect_port("ghost", p1(), w.as_str(), Side::Left, false).is_none());
        assert!(g.connect_port(r.as_str(), PortIdx::from_index(9), w.as_str(), Side::Left, false).is_none());
        assert!(g.connect_port(r.as_str(), p1(), "ghost", Side::Left, false).is_none());
        assert!(g.detach("ghost", Side::Left).is_err());
    }

    #[test]
    fn removing_a_node_floats_its_wires() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(5.0, 5.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        g.connect_port(r.as_str(), p1(), w.as_str(), Side::Right, false).unwrap();

        assert!(g.remove_node(r.as_str()).is_some());
        let end = g.get_edge(w.as_str()).unwrap().conn(Side::Right);
        assert!(end.is_floating());
        assert!(end.position(&g).unwrap().approx_eq(&Point::mm(5.0, 6.0), Tolerances::default()));
        assert!(g.remove_node(r.as_str()).is_none());
        g.validate().unwrap();
    }

    #[test]
    fn removing_an_edge_frees_its_ports() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(0.0, 0.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        g.connect_port(r.as_str(), p1(), w.as_str(), Side::Left, false).unwrap();

        assert!(g.remove_edge(w.as_str()).is_some());
        assert!(g.get_node(r.as_str()).unwrap().connection(p1()).is_none());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn attached_ends_follow_moved_nodes() {
        let mut g = board();
        let r = g.component(resistor(), "R1", Point::mm(0.0, 0.0));
        let w = g.wire(dupont(), Point::mm(0.0, 0.0), Point::mm(1.0, 0.0));
        g.connect_port(r.as_str(), p1(), w.as_str(), Side::Left, false).unwrap();

        g.move_node(r.as_str(), Point::mm(20.0, 0.0)).unwrap();
        let end = g.get_edge(w.as_str()).unwrap().conn(Side::Left);
        assert!(end.position(&g).unwrap().approx_eq(&Point::mm(20.0, 1.0), Tolerances::default()));
        assert_eq!(end.port(&g).map(|(_, p)| p.id()), Some("p1"));
        assert!(g.move_node("ghost", Point::origin()).is_err());
    }
}

//! Wires and their ends.

use std::fmt;
use std::rc::Rc;

use bg_core::Point;
use bg_resource::{ConnectorType, Port, PortIdx};
use serde::{Deserialize, Serialize};

use crate::graph::BoardGraph;
use crate::ids::{EdgeId, NodeId};

/// Which end of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        })
    }
}

/// Where one end of a wire is.
#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    /// Plugged into a port of a node in the same graph.
    Attached { node: NodeId, port: PortIdx },
    /// Loose, at an absolute position.
    Floating { pos: Point },
}

/// One end of a [`WireEdge`]: a connector plus where it is plugged in.
#[derive(Clone, Debug)]
pub struct Connection {
    connector: Rc<ConnectorType>,
    endpoint: Endpoint,
}

impl Connection {
    pub fn floating(connector: Rc<ConnectorType>, pos: Point) -> Self {
        Self {
            connector,
            endpoint: Endpoint::Floating { pos },
        }
    }

    pub fn attached(connector: Rc<ConnectorType>, node: NodeId, port: PortIdx) -> Self {
        Self {
            connector,
            endpoint: Endpoint::Attached { node, port },
        }
    }

    pub fn connector(&self) -> &Rc<ConnectorType> {
        &self.connector
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.endpoint, Endpoint::Floating { .. })
    }

    pub fn is_attached(&self) -> bool {
        !self.is_floating()
    }

    /// The node this end is plugged into, if attached.
    pub fn node(&self) -> Option<&NodeId> {
        match &self.endpoint {
            Endpoint::Attached { node, .. } => Some(node),
            Endpoint::Floating { .. } => None,
        }
    }

    /// Absolute position of this end. An attached end follows its node; `None`
    /// if the node or port no longer resolves in `graph`.
    pub fn position(&self, graph: &BoardGraph) -> Option<Point> {
        match &self.endpoint {
            Endpoint::Attached { node, port } => graph.get_node(node.as_str())?.port_position(*port),
            Endpoint::Floating { pos } => Some(*pos),
        }
    }

    /// The port this end is plugged into. Floating ends have none.
    pub fn port<'g>(&self, graph: &'g BoardGraph) -> Option<(PortIdx, &'g Port)> {
        match &self.endpoint {
            Endpoint::Attached { node, port } => {
                let found = graph.get_node(node.as_str())?.ty().port(*port)?;
                Some((*port, found))
            }
            Endpoint::Floating { .. } => None,
        }
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = endpoint;
    }
}

/// The edge and end plugged into a node's port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeConnection {
    pub edge: EdgeId,
    pub side: Side,
}

/// A wire between two ends, with optional user-drawn waypoints.
#[derive(Clone, Debug)]
pub struct WireEdge {
    id: EdgeId,
    conns: [Connection; 2],
    points: Vec<Point>,
}

impl WireEdge {
    pub fn new(id: EdgeId, left: Connection, right: Connection) -> Self {
        Self {
            id,
            conns: [left, right],
            points: Vec::new(),
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn conn(&self, side: Side) -> &Connection {
        &self.conns[side.index()]
    }

    pub fn conns(&self) -> impl Iterator<Item = (Side, &Connection)> {
        Side::BOTH.into_iter().zip(self.conns.iter())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
    }

    pub(crate) fn conn_mut(&mut self, side: Side) -> &mut Connection {
        &mut self.conns[side.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dupont() -> Rc<ConnectorType> {
        Rc::new(ConnectorType::new("dupont", "Dupont"))
    }

    #[test]
    fn side_text_and_other() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"LEFT\"");
        assert_eq!(serde_json::from_str::<Side>("\"RIGHT\"").unwrap(), Side::Right);
        assert_eq!(Side::Left.other(), Side::Right);
        assert_eq!(Side::Right.to_string(), "RIGHT");
    }

    #[test]
    fn connection_state_queries() {
        let loose = Connection::floating(dupont(), Point::mm(1.0, 2.0));
        assert!(loose.is_floating());
        assert!(loose.node().is_none());

        let plugged = Connection::attached(dupont(), NodeId::from("n1"), PortIdx::from_index(0));
        assert!(plugged.is_attached());
        assert_eq!(plugged.node().map(NodeId::as_str), Some("n1"));
    }

    #[test]
    fn wire_ends_are_addressed_by_side() {
        let mut wire = WireEdge::new(
            EdgeId::from("e1"),
            Connection::floating(dupont(), Point::mm(0.0, 0.0)),
            Connection::floating(dupont(), Point::mm(5.0, 0.0)),
        );
        wire.set_points(vec![Point::mm(2.5, 1.0)]);
        let sides: Vec<_> = wire.conns().map(|(side, _)| side).collect();
        assert_eq!(sides, Side::BOTH);
        assert_eq!(
            wire.conn(Side::Right).endpoint(),
            &Endpoint::Floating { pos: Point::mm(5.0, 0.0) }
        );
        assert_eq!(wire.points().len(), 1);
    }

    #[test]
    fn attached_end_resolves_through_graph() {
        use bg_core::{Footprint, Tolerances};
        use bg_resource::{ComponentType, ResourceCache};

        let led = Rc::new(ComponentType::new(
            "led",
            "LED",
            Footprint::new(vec![Point::mm(0.0, 0.0), Point::mm(2.0, 2.0)]),
            [Port::new("anode", "Anode", Point::mm(0.0, 1.0))],
        ));
        let mut graph = BoardGraph::new(Rc::new(ResourceCache::new("unused")));
        let node = graph
            .component_with_id("d1", led, "D1", Point::mm(3.0, 3.0))
            .unwrap();

        let plugged = Connection::attached(dupont(), node, PortIdx::from_index(0));
        let pos = plugged.position(&graph).unwrap();
        assert!(pos.approx_eq(&Point::mm(3.0, 4.0), Tolerances::default()));
        let (idx, port) = plugged.port(&graph).unwrap();
        assert_eq!(idx, PortIdx::from_index(0));
        assert_eq!(port.id(), "anode");

        let stale = Connection::attached(dupont(), NodeId::from("gone"), PortIdx::from_index(0));
        assert!(stale.position(&graph).is_none());
        assert!(stale.port(&graph).is_none());

        let loose = Connection::floating(dupont(), Point::mm(7.0, 0.0));
        assert_eq!(loose.position(&graph), Some(Point::mm(7.0, 0.0)));
        assert!(loose.port(&graph).is_none());
    }
}

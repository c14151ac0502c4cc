//! Placed component instances.

use std::collections::BTreeMap;
use std::rc::Rc;

use bg_core::{Aabb, Point};
use bg_resource::{ComponentType, PortIdx};

use crate::edge::EdgeConnection;
use crate::ids::NodeId;

/// A component placed on the board.
#[derive(Clone, Debug)]
pub struct ComponentNode {
    id: NodeId,
    name: String,
    pos: Point,
    bounds: Aabb,
    ty: Rc<ComponentType>,
    edges: BTreeMap<PortIdx, EdgeConnection>,
}

impl ComponentNode {
    pub fn new(id: NodeId, name: impl Into<String>, ty: Rc<ComponentType>, pos: Point) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            bounds: *ty.footprint().aabb() + pos,
            ty,
            edges: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Footprint bounds moved to the node's position.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn ty(&self) -> &Rc<ComponentType> {
        &self.ty
    }

    /// Absolute position of a port, or `None` if the type has no such port.
    pub fn port_position(&self, port: PortIdx) -> Option<Point> {
        self.ty.port(port).map(|p| self.pos + p.offset())
    }

    /// What is plugged into `port`, if anything.
    pub fn connection(&self, port: PortIdx) -> Option<&EdgeConnection> {
        self.edges.get(&port)
    }

    /// Every occupied port, in port order.
    pub fn connections(&self) -> impl Iterator<Item = (PortIdx, &EdgeConnection)> {
        self.edges.iter().map(|(port, conn)| (*port, conn))
    }

    pub(crate) fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
        self.bounds = *self.ty.footprint().aabb() + pos;
    }

    pub(crate) fn edges_mut(&mut self) -> &mut BTreeMap<PortIdx, EdgeConnection> {
        &mut self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::{Footprint, Tolerances};
    use bg_resource::Port;

    fn led() -> Rc<ComponentType> {
        Rc::new(ComponentType::new(
            "led",
            "LED",
            Footprint::new(vec![Point::mm(0.0, 0.0), Point::mm(3.0, 2.0)]),
            [
                Port::new("a", "Anode", Point::mm(0.0, 1.0)),
                Port::new("k", "Cathode", Point::mm(3.0, 1.0)),
            ],
        ))
    }

    #[test]
    fn bounds_follow_position() {
        let mut node = ComponentNode::new(NodeId::from("d1"), "D1", led(), Point::mm(10.0, 10.0));
        assert!(node.bounds().max.approx_eq(&Point::mm(13.0, 12.0), Tolerances::default()));

        node.set_pos(Point::mm(0.0, 0.0));
        assert!(node.bounds().min.approx_eq(&Point::mm(0.0, 0.0), Tolerances::default()));
    }

    #[test]
    fn port_positions_are_absolute() {
        let node = ComponentNode::new(NodeId::from("d1"), "D1", led(), Point::mm(10.0, 0.0));
        let k = node.ty().port_index("k").unwrap();
        assert!(node.port_position(k).unwrap().approx_eq(&Point::mm(13.0, 1.0), Tolerances::default()));
        assert!(node.port_position(PortIdx::from_index(7)).is_none());
        assert!(node.connection(k).is_none());
    }
}

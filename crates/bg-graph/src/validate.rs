//! Link consistency between node port maps and edge ends.

use std::collections::BTreeMap;

use crate::edge::{Endpoint, WireEdge};
use crate::error::StructuralError;
use crate::ids::{EdgeId, NodeId};
use crate::node::ComponentNode;

/// Every port-map entry must name a port of the node's type and an edge whose
/// end is attached back to that port; every attached edge end must name an
/// existing node, a port on its type, and be recorded in its port map.
pub(crate) fn validate_links(
    nodes: &BTreeMap<NodeId, ComponentNode>,
    edges: &BTreeMap<EdgeId, WireEdge>,
) -> Result<(), StructuralError> {
    for node in nodes.values() {
        for (port, conn) in node.connections() {
            if node.ty().port(port).is_none() {
                return Err(StructuralError::UnknownPort {
                    node: node.id().to_string(),
                    port: port.to_string(),
                });
            }
            let wire = edges
                .get(&conn.edge)
                .ok_or_else(|| StructuralError::UnknownEdge {
                    edge: conn.edge.to_string(),
                })?;
            let points_back = matches!(
                wire.conn(conn.side).endpoint(),
                Endpoint::Attached { node: n, port: p } if n == node.id() && *p == port
            );
            if !points_back {
                return Err(StructuralError::DanglingConnection {
                    edge: conn.edge.to_string(),
                    side: conn.side,
                    node: node.id().to_string(),
                });
            }
        }
    }

    for wire in edges.values() {
        for (side, conn) in wire.conns() {
            let Endpoint::Attached { node: node_id, port } = conn.endpoint() else {
                continue;
            };
            let node = nodes
                .get(node_id)
                .ok_or_else(|| StructuralError::UnknownNode {
                    node: node_id.to_string(),
                })?;
            if node.ty().port(*port).is_none() {
                return Err(StructuralError::UnknownPort {
                    node: node_id.to_string(),
                    port: port.to_string(),
                });
            }
            let recorded = node
                .connection(*port)
                .is_some_and(|c| c.edge == *wire.id() && c.side == side);
            if !recorded {
                return Err(StructuralError::DanglingConnection {
                    edge: wire.id().to_string(),
                    side,
                    node: node_id.to_string(),
                });
            }
        }
    }

    Ok(())
}

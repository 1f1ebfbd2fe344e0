//! Orientation propagation: choose normal signs so that neighbours agree.
//!
//! Iterative depth-first traversal with an explicit stack. A vertex's sign is
//! fixed when it is first discovered (flipped if it disagrees with the vertex
//! that discovered it); every later edge into an already discovered vertex is
//! only checked. A non-positive dot product on such an edge means two paths
//! demand opposite signs, which aborts the run with `InconsistentOrientation`.
//! Each connected component gets its own root (lowest unvisited vertex).

use nalgebra::Vector3;
use tracing::{debug, trace};

use crate::error::NetError;
use crate::frame::LocalFrame;
use crate::graph::{PeriodicGraph, VertexId};

/// Sign-resolved normals plus traversal statistics.
#[derive(Clone, Debug)]
pub struct Orientation {
    pub normals: Vec<Vector3<f64>>,
    /// Number of normals negated during propagation.
    pub flips: usize,
    /// One root per connected component, in traversal order.
    pub roots: Vec<VertexId>,
}

/// Propagate signs through `graph`, consuming the unsigned `normals` buffer.
pub fn propagate_orientation(
    graph: &PeriodicGraph,
    mut normals: Vec<Vector3<f64>>,
) -> Result<Orientation, NetError> {
    let n = graph.num_vertices();
    if normals.len() != n {
        return Err(NetError::malformed(format!(
            "{} normals for {n} vertices",
            normals.len()
        )));
    }
    let mut visited = vec![false; n];
    let mut stack: Vec<VertexId> = Vec::new();
    let mut flips = 0usize;
    let mut roots = Vec::new();
    for root in graph.vertex_ids() {
        if visited[root.0] {
            continue;
        }
        debug!(root = root.0, "orientation component root");
        roots.push(root);
        visited[root.0] = true;
        stack.push(root);
        while let Some(v) = stack.pop() {
            let n_v = normals[v.0];
            for &h in graph.outgoing(v) {
                let u = graph.halfedge(h).head;
                let n_u = normals[u.0];
                let dot = n_v.dot(&n_u);
                if visited[u.0] {
                    if dot <= 0.0 {
                        return Err(NetError::InconsistentOrientation {
                            vertex: u,
                            from: v,
                            normal_from: [n_v.x, n_v.y, n_v.z],
                            normal_to: [n_u.x, n_u.y, n_u.z],
                            dot,
                        });
                    }
                    continue;
                }
                if dot <= 0.0 {
                    trace!(vertex = u.0, from = v.0, dot, "flip normal");
                    normals[u.0] = -n_u;
                    flips += 1;
                }
                visited[u.0] = true;
                stack.push(u);
            }
        }
    }
    debug!(flips, components = roots.len(), "orientation resolved");
    Ok(Orientation {
        normals,
        flips,
        roots,
    })
}

/// Propagate signs starting from fitted frames.
pub fn orient_frames(graph: &PeriodicGraph, frames: &[LocalFrame]) -> Result<Orientation, NetError> {
    propagate_orientation(graph, frames.iter().map(|f| f.normal).collect())
}

//! Rotation system: cyclic order of outgoing half-edges around each vertex.
//!
//! Per vertex: project the incident displacements onto the plane orthogonal to
//! the oriented normal, take the first projection as reference direction, sort
//! by the signed angle `atan2(n · (ref × p), ref · p)` ascending, and link each
//! half-edge to the next one in that cyclic order. Vertices are independent of
//! each other once normals are resolved.

use nalgebra::Vector3;

use crate::cfg::NetCfg;
use crate::error::NetError;
use crate::graph::{HalfEdgeId, PeriodicGraph, VertexId};

/// Successor function "next half-edge counter-clockwise around the shared tail".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationSystem {
    next: Vec<HalfEdgeId>,
}

impl RotationSystem {
    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.next[h.0]
    }
    #[inline]
    pub fn successors(&self) -> &[HalfEdgeId] {
        &self.next
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.next.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Cyclic order around `v`, starting at its first outgoing half-edge.
    pub fn around(&self, graph: &PeriodicGraph, v: VertexId) -> Vec<HalfEdgeId> {
        let Some(&first) = graph.outgoing(v).first() else {
            return Vec::new();
        };
        let mut cycle = vec![first];
        let mut h = self.next(first);
        while h != first && cycle.len() <= graph.degree(v) {
            cycle.push(h);
            h = self.next(h);
        }
        cycle
    }
}

/// Signed angle from `reference` to `p` about `normal`, in (−π, π].
#[inline]
pub fn signed_angle(reference: &Vector3<f64>, p: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    normal.dot(&reference.cross(p)).atan2(reference.dot(p))
}

/// Outgoing half-edges of `v` sorted by signed angle around `normal`.
pub fn rotation_at(
    graph: &PeriodicGraph,
    v: VertexId,
    normal: &Vector3<f64>,
    cfg: NetCfg,
) -> Result<Vec<HalfEdgeId>, NetError> {
    let out = graph.outgoing(v);
    if out.is_empty() {
        return Ok(Vec::new());
    }
    let n = normal
        .try_normalize(f64::EPSILON)
        .ok_or_else(|| NetError::malformed(format!("zero normal at vertex {v}")))?;
    let mut projected = Vec::with_capacity(out.len());
    for &h in out {
        let d = graph.displacement(h);
        let p = d - n * n.dot(&d);
        let len = p.norm();
        if !(len > cfg.eps_proj * d.norm()) {
            return Err(NetError::DegenerateRotation {
                vertex: v,
                halfedge: h,
            });
        }
        projected.push((h, p / len));
    }
    let reference = projected[0].1;
    let mut keyed: Vec<(HalfEdgeId, f64)> = projected
        .iter()
        .map(|(h, p)| (*h, signed_angle(&reference, p, &n)))
        .collect();
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    Ok(keyed.into_iter().map(|(h, _)| h).collect())
}

/// Build the rotation system of the whole graph from oriented normals.
pub fn build_rotation_system(
    graph: &PeriodicGraph,
    normals: &[Vector3<f64>],
    cfg: NetCfg,
) -> Result<RotationSystem, NetError> {
    if normals.len() != graph.num_vertices() {
        return Err(NetError::malformed(format!(
            "{} normals for {} vertices",
            normals.len(),
            graph.num_vertices()
        )));
    }
    let mut next: Vec<Option<HalfEdgeId>> = vec![None; graph.num_halfedges()];
    for v in graph.vertex_ids() {
        let order = rotation_at(graph, v, &normals[v.0], cfg)?;
        for (i, &h) in order.iter().enumerate() {
            next[h.0] = Some(order[(i + 1) % order.len()]);
        }
    }
    // Every half-edge has a tail, so every slot was filled above.
    let next = next
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.unwrap_or(HalfEdgeId(i)))
        .collect();
    Ok(RotationSystem { next })
}

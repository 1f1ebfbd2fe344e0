//! Construction and validation of the periodic graph.

use std::collections::HashMap;

use nalgebra::{Matrix3, Vector3};

use super::types::{HalfEdge, HalfEdgeId, VertexId};
use crate::error::NetError;

/// Quotient graph of a 3-periodic net.
///
/// Invariants (checked by [`PeriodicGraph::new`]):
/// - every half-edge endpoint is a valid vertex index;
/// - `inversions` is a fixed-point-free involution;
/// - twins swap endpoints and negate the cell;
/// - `adj[v]` lists exactly the half-edges with tail `v`, in index order.
#[derive(Clone, Debug)]
pub struct PeriodicGraph {
    periods: Matrix3<f64>,
    positions: Vec<Vector3<f64>>,
    halfedges: Vec<HalfEdge>,
    inversions: Vec<HalfEdgeId>,
    adj: Vec<Vec<HalfEdgeId>>,
}

impl PeriodicGraph {
    /// Build and validate. Fails with `MalformedGraph` on any broken invariant.
    pub fn new(
        periods: Matrix3<f64>,
        positions: Vec<Vector3<f64>>,
        halfedges: Vec<HalfEdge>,
        inversions: Vec<HalfEdgeId>,
    ) -> Result<Self, NetError> {
        if periods.iter().any(|x| !x.is_finite()) {
            return Err(NetError::malformed("period matrix has non-finite entries"));
        }
        if let Some(v) = positions.iter().position(|p| p.iter().any(|x| !x.is_finite())) {
            return Err(NetError::malformed(format!(
                "vertex {} has a non-finite position",
                VertexId(v)
            )));
        }
        if inversions.len() != halfedges.len() {
            return Err(NetError::malformed(format!(
                "{} inversions for {} half-edges",
                inversions.len(),
                halfedges.len()
            )));
        }
        let n = positions.len();
        for (i, he) in halfedges.iter().enumerate() {
            if he.tail.0 >= n || he.head.0 >= n {
                return Err(NetError::malformed(format!(
                    "half-edge {} ({} -> {}) names a vertex outside 0..{n}",
                    HalfEdgeId(i),
                    he.tail,
                    he.head
                )));
            }
        }
        validate_inversions(&halfedges, &inversions)?;
        let mut adj: Vec<Vec<HalfEdgeId>> = vec![Vec::new(); n];
        for (i, he) in halfedges.iter().enumerate() {
            adj[he.tail.0].push(HalfEdgeId(i));
        }
        Ok(Self {
            periods,
            positions,
            halfedges,
            inversions,
            adj,
        })
    }

    /// Build with inversions derived from the half-edge list (see [`derive_inversions`]).
    pub fn with_derived_inversions(
        periods: Matrix3<f64>,
        positions: Vec<Vector3<f64>>,
        halfedges: Vec<HalfEdge>,
    ) -> Result<Self, NetError> {
        let inversions = derive_inversions(&halfedges)?;
        Self::new(periods, positions, halfedges, inversions)
    }

    #[inline]
    pub fn periods(&self) -> &Matrix3<f64> {
        &self.periods
    }
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }
    /// Undirected edges of the quotient graph.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }
    #[inline]
    pub fn position(&self, v: VertexId) -> Vector3<f64> {
        self.positions[v.0]
    }
    #[inline]
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }
    #[inline]
    pub fn halfedge(&self, h: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[h.0]
    }
    #[inline]
    pub fn halfedges(&self) -> &[HalfEdge] {
        &self.halfedges
    }
    #[inline]
    pub fn inversion(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.inversions[h.0]
    }
    #[inline]
    pub fn inversions(&self) -> &[HalfEdgeId] {
        &self.inversions
    }
    /// Half-edges whose tail is `v`, in index order.
    #[inline]
    pub fn outgoing(&self, v: VertexId) -> &[HalfEdgeId] {
        &self.adj[v.0]
    }
    #[inline]
    pub fn degree(&self, v: VertexId) -> usize {
        self.adj[v.0].len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.positions.len()).map(VertexId)
    }

    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> {
        (0..self.halfedges.len()).map(HalfEdgeId)
    }

    /// Ambient vector from the tail to the (translated) head of `h`.
    #[inline]
    pub fn displacement(&self, h: HalfEdgeId) -> Vector3<f64> {
        let he = &self.halfedges[h.0];
        self.positions[he.head.0] + he.cell.to_ambient(&self.periods) - self.positions[he.tail.0]
    }
}

fn validate_inversions(halfedges: &[HalfEdge], inversions: &[HalfEdgeId]) -> Result<(), NetError> {
    let m = halfedges.len();
    for (i, &j) in inversions.iter().enumerate() {
        let h = HalfEdgeId(i);
        if j.0 >= m {
            return Err(NetError::malformed(format!(
                "inversion of {h} is {j}, outside 0..{m}"
            )));
        }
        if j == h {
            return Err(NetError::malformed(format!("{h} is its own inversion")));
        }
        if inversions[j.0] != h {
            return Err(NetError::malformed(format!(
                "inversion is not an involution: {h} -> {j} -> {}",
                inversions[j.0]
            )));
        }
        let (a, b) = (&halfedges[i], &halfedges[j.0]);
        if b.tail != a.head || b.head != a.tail {
            return Err(NetError::malformed(format!(
                "twins {h} ({} -> {}) and {j} ({} -> {}) do not swap endpoints",
                a.tail, a.head, b.tail, b.head
            )));
        }
        if a.cell.checked_neg() != Some(b.cell) {
            return Err(NetError::malformed(format!(
                "twins {h} and {j} have cells {} and {}, expected negatives",
                a.cell, b.cell
            )));
        }
    }
    Ok(())
}

/// Pair every half-edge `(t, h, c)` with an unused `(h, t, -c)`.
///
/// Candidates are taken in index order, so twins emitted adjacently by a loader
/// pair with each other. Unmatched half-edges are `MalformedGraph`.
pub fn derive_inversions(halfedges: &[HalfEdge]) -> Result<Vec<HalfEdgeId>, NetError> {
    let mut pending: HashMap<HalfEdge, Vec<usize>> = HashMap::new();
    let mut inversions: Vec<Option<HalfEdgeId>> = vec![None; halfedges.len()];
    for (i, he) in halfedges.iter().enumerate() {
        let twin = he.checked_reversed().ok_or_else(|| {
            NetError::malformed(format!(
                "half-edge {} has cell {}, which has no negation",
                HalfEdgeId(i),
                he.cell
            ))
        })?;
        let matched = pending.get_mut(&twin).and_then(|waiting| {
            if waiting.is_empty() {
                None
            } else {
                Some(waiting.remove(0))
            }
        });
        match matched {
            Some(j) => {
                inversions[i] = Some(HalfEdgeId(j));
                inversions[j] = Some(HalfEdgeId(i));
            }
            None => pending.entry(*he).or_default().push(i),
        }
    }
    inversions
        .into_iter()
        .enumerate()
        .map(|(i, inv)| {
            inv.ok_or_else(|| {
                let he = &halfedges[i];
                NetError::malformed(format!(
                    "half-edge {} ({} -> {} via {}) has no reverse twin",
                    HalfEdgeId(i),
                    he.tail,
                    he.head,
                    he.cell
                ))
            })
        })
        .collect()
}

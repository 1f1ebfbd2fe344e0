//! Global yes/no geometric checks built on the local frame estimator.
//!
//! - Coplanarity: every vertex of degree > 3 has planarity residual ≤ τ.
//!   Degree ≤ 3 vertices are skipped.
//! - Orthogonality: some half-edge joins two vertices whose unsigned normals
//!   have |n_a · n_b| ≤ τ.
//!
//! Both scans stop at the first witness.

use tracing::debug;

use crate::cfg::NetCfg;
use crate::error::NetError;
use crate::frame::{estimate_frame, planarity_residual, LocalFrame};
use crate::graph::{HalfEdgeId, PeriodicGraph, VertexId};

/// Outcome of the coplanarity check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coplanarity {
    Coplanar,
    NonCoplanar { vertex: VertexId, residual: f64 },
}

impl Coplanarity {
    #[inline]
    pub fn is_coplanar(&self) -> bool {
        matches!(self, Coplanarity::Coplanar)
    }
}

/// Witness of the orthogonality check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthogonalEdge {
    pub halfedge: HalfEdgeId,
    pub tail: VertexId,
    pub head: VertexId,
    pub dot: f64,
}

/// Scan vertices in index order for a non-planar neighbourhood.
pub fn check_coplanarity(graph: &PeriodicGraph, cfg: NetCfg) -> Coplanarity {
    for v in graph.vertex_ids() {
        if graph.degree(v) <= 3 {
            continue;
        }
        let residual = planarity_residual(graph, v);
        if residual > cfg.tol {
            debug!(vertex = v.0, residual, "non-coplanar vertex");
            return Coplanarity::NonCoplanar {
                vertex: v,
                residual,
            };
        }
    }
    Coplanarity::Coplanar
}

/// Scan half-edges in index order against precomputed frames.
///
/// `frames[v]` is `None` for vertices whose normal is underdetermined; edges
/// touching them are skipped.
pub fn find_orthogonal_edge(
    graph: &PeriodicGraph,
    frames: &[Option<LocalFrame>],
    cfg: NetCfg,
) -> Result<Option<OrthogonalEdge>, NetError> {
    if frames.len() != graph.num_vertices() {
        return Err(NetError::malformed(format!(
            "{} frames for {} vertices",
            frames.len(),
            graph.num_vertices()
        )));
    }
    for h in graph.halfedge_ids() {
        let he = graph.halfedge(h);
        let (Some(a), Some(b)) = (&frames[he.tail.0], &frames[he.head.0]) else {
            continue;
        };
        let dot = a.normal.dot(&b.normal);
        if dot.abs() <= cfg.tol {
            debug!(halfedge = h.0, dot, "orthogonal normals");
            return Ok(Some(OrthogonalEdge {
                halfedge: h,
                tail: he.tail,
                head: he.head,
                dot,
            }));
        }
    }
    Ok(None)
}

/// Fit frames and look for an orthogonal edge.
pub fn check_orthogonality(
    graph: &PeriodicGraph,
    cfg: NetCfg,
) -> Result<Option<OrthogonalEdge>, NetError> {
    let frames: Vec<Option<LocalFrame>> = graph
        .vertex_ids()
        .map(|v| match estimate_frame(graph, v, cfg) {
            Ok(f) => Ok(Some(f)),
            Err(NetError::UnderdeterminedFrame { .. }) => Ok(None),
            Err(e) => Err(e),
        })
        .collect::<Result<_, _>>()?;
    find_orthogonal_edge(graph, &frames, cfg)
}

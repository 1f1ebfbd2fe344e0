//! Local frame estimation: per-vertex tangent-plane normal from incident edges.
//!
//! The displacement vectors of a vertex's outgoing half-edges are stacked as
//! rows; the right singular vector of the smallest singular value is the
//! (sign-ambiguous) normal, and that singular value is the planarity residual.
//! Fewer than three rows are padded with zero rows, which leaves the right
//! singular vectors unchanged and keeps `V^T` square.

use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::cfg::NetCfg;
use crate::error::NetError;
use crate::graph::{PeriodicGraph, VertexId};

/// Fitted tangent frame of one vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    /// Unit normal; its sign is arbitrary until orientation propagation.
    pub normal: Vector3<f64>,
    /// Smallest singular value (≈0 ⇔ neighbours coplanar).
    pub residual: f64,
    /// Singular values in descending order.
    pub singular_values: Vector3<f64>,
    pub degree: usize,
}

/// Singular values (descending) and the matching right singular vectors as rows.
#[derive(Clone, Copy, Debug)]
pub struct Spectrum {
    pub singular_values: Vector3<f64>,
    pub v_t: Matrix3<f64>,
}

/// Rows = displacement vectors of `v`'s outgoing half-edges, zero-padded to ≥ 3 rows.
pub fn displacement_matrix(graph: &PeriodicGraph, v: VertexId) -> DMatrix<f64> {
    let out = graph.outgoing(v);
    let mut m = DMatrix::<f64>::zeros(out.len().max(3), 3);
    for (i, &h) in out.iter().enumerate() {
        let d = graph.displacement(h);
        for j in 0..3 {
            m[(i, j)] = d[j];
        }
    }
    m
}

/// SVD of the displacement matrix, sorted by descending singular value.
pub fn spectrum(graph: &PeriodicGraph, v: VertexId) -> Spectrum {
    let svd = displacement_matrix(graph, v).svd(false, true);
    let s = svd.singular_values;
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));
    let singular_values = Vector3::new(s[order[0]], s[order[1]], s[order[2]]);
    let v_t = match svd.v_t {
        Some(v_t) => Matrix3::from_fn(|r, c| v_t[(order[r], c)]),
        // Only reachable if the decomposition was asked not to compute V.
        None => Matrix3::zeros(),
    };
    Spectrum {
        singular_values,
        v_t,
    }
}

/// Smallest singular value of `v`'s displacement matrix.
#[inline]
pub fn planarity_residual(graph: &PeriodicGraph, v: VertexId) -> f64 {
    spectrum(graph, v).singular_values[2]
}

/// Fit the local frame of `v`.
///
/// Fails with `UnderdeterminedFrame` when the displacements do not span a plane
/// (no edges, or all edges collinear): the least-significant direction is then
/// not unique.
pub fn estimate_frame(graph: &PeriodicGraph, v: VertexId, cfg: NetCfg) -> Result<LocalFrame, NetError> {
    let sp = spectrum(graph, v);
    let s = sp.singular_values;
    let degree = graph.degree(v);
    let underdetermined = || NetError::UnderdeterminedFrame {
        vertex: v,
        degree,
        singular_values: [s[0], s[1], s[2]],
    };
    if !(s[0] > 0.0) || s[1] <= cfg.eps_rank * s[0] {
        return Err(underdetermined());
    }
    let normal = sp
        .v_t
        .row(2)
        .transpose()
        .try_normalize(f64::EPSILON)
        .ok_or_else(underdetermined)?;
    Ok(LocalFrame {
        normal,
        residual: s[2],
        singular_values: s,
        degree,
    })
}

/// Fit every vertex's frame; the first underdetermined vertex aborts the run.
pub fn estimate_frames(graph: &PeriodicGraph, cfg: NetCfg) -> Result<Vec<LocalFrame>, NetError> {
    graph
        .vertex_ids()
        .map(|v| estimate_frame(graph, v, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn square_net_normal_is_z_with_zero_residual() {
        let g = fixtures::square_net().unwrap();
        let f = estimate_frame(&g, VertexId(0), NetCfg::default()).unwrap();
        assert!((f.normal.z.abs() - 1.0).abs() < 1e-12);
        assert!(f.residual < 1e-12);
        assert_eq!(f.degree, 4);
        assert!((f.normal.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_values_are_descending() {
        let g = fixtures::skew_triangular_net().unwrap();
        let sp = spectrum(&g, VertexId(0));
        let s = sp.singular_values;
        assert!(s[0] >= s[1] && s[1] >= s[2]);
        assert!(s[2] > 0.0);
        // The tilted third period pulls the normal only slightly off z.
        let n = sp.v_t.row(2).transpose();
        assert!(n.z.abs() > 0.99);
    }

    #[test]
    fn degree_three_vertex_uses_padded_matrix() {
        // Vertex 0 of the orthogonal pair sees +z/2 and ±y: normal is ±x.
        let g = fixtures::orthogonal_pair().unwrap();
        assert_eq!(displacement_matrix(&g, VertexId(0)).nrows(), 3);
        let f = estimate_frame(&g, VertexId(0), NetCfg::default()).unwrap();
        assert!((f.normal.x.abs() - 1.0).abs() < 1e-12);
        assert!(f.residual.abs() < 1e-12);
    }

    #[test]
    fn collinear_edges_are_underdetermined() {
        // Single vertex with loops along ±x only.
        let g = PeriodicGraph::with_derived_inversions(
            Matrix3::identity(),
            vec![Vector3::zeros()],
            vec![
                crate::graph::HalfEdge::new(0, 0, crate::graph::Cell::new(1, 0, 0)),
                crate::graph::HalfEdge::new(0, 0, crate::graph::Cell::new(-1, 0, 0)),
            ],
        )
        .unwrap();
        let err = estimate_frame(&g, VertexId(0), NetCfg::default()).unwrap_err();
        assert!(matches!(
            err,
            NetError::UnderdeterminedFrame { vertex: VertexId(0), degree: 2, .. }
        ));
        assert!(estimate_frames(&g, NetCfg::default()).is_err());
    }

    #[test]
    fn cubic_vertex_has_large_residual() {
        let g = fixtures::cubic_net().unwrap();
        let r = planarity_residual(&g, VertexId(0));
        assert!((r - 2f64.sqrt()).abs() < 1e-9);
    }
}

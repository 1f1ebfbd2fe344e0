//! Hand-built nets used in tests, benchmarks and the `fixture` CLI command.
//!
//! Purpose
//! - Provide small quotient graphs whose rotation systems and faces are known
//!   by hand: trivial periodic nets, a non-trivial one, a closed polyhedron, and
//!   the boundary cases of the diagnostics.
//! - `jitter` perturbs positions reproducibly (seeded `StdRng`) so invariants can
//!   be checked away from the exact symmetric geometry.
//!
//! Expected results
//! - `square_net`: one vertex, one square face, trivial.
//! - `triangular_net`: one vertex, two triangles, trivial.
//! - `skew_triangular_net`: one vertex, two triangles with translations ±(1,1,-1).
//! - `icosahedron`: 12 vertices, 20 triangles, all cells zero.
//! - `tetrahedron`: every vertex has degree 3 (coplanarity skip rule).
//! - `squashed_diamond_net`: two vertices, 3-periodic, two quadrilaterals with
//!   translations ±(1,1,-1).
//! - `cubic_net`: one vertex of degree 6 spanning all three axes (not coplanar).
//! - `orthogonal_pair`: fitted normals x and y joined by half-edge 0.

use nalgebra::{Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::NetError;
use crate::graph::{Cell, HalfEdge, PeriodicGraph};

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 8] = [
    "square",
    "triangular",
    "skew-triangular",
    "squashed-diamond",
    "icosahedron",
    "tetrahedron",
    "cubic",
    "orthogonal-pair",
];

/// Look up a fixture by its CLI name.
pub fn by_name(name: &str) -> Option<Result<PeriodicGraph, NetError>> {
    let g = match name {
        "square" => square_net(),
        "triangular" => triangular_net(),
        "skew-triangular" => skew_triangular_net(),
        "squashed-diamond" => squashed_diamond_net(),
        "icosahedron" => icosahedron(),
        "tetrahedron" => tetrahedron(),
        "cubic" => cubic_net(),
        "orthogonal-pair" => orthogonal_pair(),
        _ => return None,
    };
    Some(g)
}

/// Push `(t, h, c)` and its twin `(h, t, -c)`.
fn push_edge(halfedges: &mut Vec<HalfEdge>, tail: usize, head: usize, cell: Cell) {
    let he = HalfEdge::new(tail, head, cell);
    halfedges.push(he);
    halfedges.push(he.reversed());
}

/// Single vertex with one loop per listed cell.
fn single_vertex_net(periods: Matrix3<f64>, cells: &[Cell]) -> Result<PeriodicGraph, NetError> {
    let mut halfedges = Vec::with_capacity(cells.len() * 2);
    for &c in cells {
        push_edge(&mut halfedges, 0, 0, c);
    }
    PeriodicGraph::with_derived_inversions(periods, vec![Vector3::zeros()], halfedges)
}

/// Square lattice: one vertex, loops along ±x and ±y.
pub fn square_net() -> Result<PeriodicGraph, NetError> {
    single_vertex_net(
        Matrix3::identity(),
        &[Cell::new(1, 0, 0), Cell::new(0, 1, 0)],
    )
}

/// Hexagonal-lattice triangulation: loops along a, b and a+b (all in one plane).
pub fn triangular_net() -> Result<PeriodicGraph, NetError> {
    let s = 3f64.sqrt() / 2.0;
    let periods = Matrix3::new(
        1.0, 0.0, 0.0, //
        0.5, s, 0.0, //
        0.0, 0.0, 1.0,
    );
    single_vertex_net(
        periods,
        &[Cell::new(1, 0, 0), Cell::new(0, 1, 0), Cell::new(1, 1, 0)],
    )
}

/// Like `square_net` plus a diagonal loop that reaches `a + b` through the
/// third period instead of the in-plane cell `(1, 1, 0)`.
///
/// Both traced triangles close in space (up to the small z-offset of the third
/// period) but not in the lattice, so the net is not trivial.
pub fn skew_triangular_net() -> Result<PeriodicGraph, NetError> {
    let periods = Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 1.0, 0.05,
    );
    single_vertex_net(
        periods,
        &[Cell::new(1, 0, 0), Cell::new(0, 1, 0), Cell::new(0, 0, 1)],
    )
}

/// Diamond net compressed to half height along z.
///
/// Periods are the fcc vectors `(0,2,2)`, `(2,0,2)`, `(2,2,0)` with z scaled by
/// `1/2`; B sits at `(1,1,1/2)`. The squashed tetrahedral cones have a unique
/// smallest singular direction (z), and their edges project onto the four
/// diagonals of the xy plane, so the fit and the rotation are well posed. The
/// faces are helices around z: each closes in the projection but climbs one
/// `a1 + a2 - a3` step, so the net is not trivial.
pub fn squashed_diamond_net() -> Result<PeriodicGraph, NetError> {
    let s = 0.5;
    let periods = Matrix3::new(
        0.0, 2.0, 2.0 * s, //
        2.0, 0.0, 2.0 * s, //
        2.0, 2.0, 0.0,
    );
    let positions = vec![Vector3::zeros(), Vector3::new(1.0, 1.0, s)];
    let mut halfedges = Vec::with_capacity(8);
    for cell in [
        Cell::ZERO,
        Cell::new(-1, 0, 0),
        Cell::new(0, -1, 0),
        Cell::new(0, 0, -1),
    ] {
        push_edge(&mut halfedges, 0, 1, cell);
    }
    PeriodicGraph::with_derived_inversions(periods, positions, halfedges)
}

/// Primitive cubic net: one vertex, loops along all three periods.
pub fn cubic_net() -> Result<PeriodicGraph, NetError> {
    single_vertex_net(
        Matrix3::identity(),
        &[Cell::new(1, 0, 0), Cell::new(0, 1, 0), Cell::new(0, 0, 1)],
    )
}

/// Connect every pair of `points` at distance `edge` (within 1e-6); all cells zero.
fn polyhedron(points: Vec<Vector3<f64>>, edge: f64) -> Result<PeriodicGraph, NetError> {
    let mut halfedges = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if ((points[i] - points[j]).norm() - edge).abs() < 1e-6 {
                push_edge(&mut halfedges, i, j, Cell::ZERO);
            }
        }
    }
    // Cells are zero, so the periods only need to be non-degenerate.
    let periods = Matrix3::identity() * 10.0;
    PeriodicGraph::with_derived_inversions(periods, points, halfedges)
}

/// Regular icosahedron with edge length 2, centred at the origin.
pub fn icosahedron() -> Result<PeriodicGraph, NetError> {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    let mut points = Vec::with_capacity(12);
    for &a in &[-1.0, 1.0] {
        for &b in &[-phi, phi] {
            points.push(Vector3::new(0.0, a, b));
            points.push(Vector3::new(a, b, 0.0));
            points.push(Vector3::new(b, 0.0, a));
        }
    }
    polyhedron(points, 2.0)
}

/// Regular tetrahedron inscribed in the cube [-1,1]^3.
pub fn tetrahedron() -> Result<PeriodicGraph, NetError> {
    let points = vec![
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, -1.0, -1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, 1.0),
    ];
    polyhedron(points, 8f64.sqrt())
}

/// Two vertices whose fitted normals are exactly x and y, joined along z.
///
/// Vertex 0 sees `+z/2, ±y` (plane yz); vertex 1 sees `-z/2, ±x` (plane xz).
/// Half-edge 0 is the joining edge.
pub fn orthogonal_pair() -> Result<PeriodicGraph, NetError> {
    let positions = vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 0.5)];
    let mut halfedges = Vec::with_capacity(6);
    push_edge(&mut halfedges, 0, 1, Cell::ZERO);
    push_edge(&mut halfedges, 0, 0, Cell::new(0, 1, 0));
    push_edge(&mut halfedges, 1, 1, Cell::new(1, 0, 0));
    PeriodicGraph::with_derived_inversions(Matrix3::identity(), positions, halfedges)
}

/// Copy of `graph` with every position moved by a uniform offset in
/// `[-amplitude, amplitude]^3`. Same seed, same result.
pub fn jitter(graph: &PeriodicGraph, amplitude: f64, seed: u64) -> Result<PeriodicGraph, NetError> {
    // gen_range needs the width 2·amplitude to stay finite.
    if !(amplitude >= 0.0 && (2.0 * amplitude).is_finite()) {
        return Err(NetError::malformed(format!(
            "jitter amplitude must be non-negative and below {:e}, got {amplitude}",
            f64::MAX / 2.0
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let positions = graph
        .positions()
        .iter()
        .map(|p| {
            if amplitude == 0.0 {
                return *p;
            }
            let d = Vector3::new(
                rng.gen_range(-amplitude..=amplitude),
                rng.gen_range(-amplitude..=amplitude),
                rng.gen_range(-amplitude..=amplitude),
            );
            p + d
        })
        .collect();
    PeriodicGraph::new(
        *graph.periods(),
        positions,
        graph.halfedges().to_vec(),
        graph.inversions().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).unwrap().is_ok(), "{name}");
        }
        assert!(by_name("dia").is_none());
    }

    #[test]
    fn jitter_is_reproducible_and_keeps_topology() {
        let g = squashed_diamond_net().unwrap();
        let a = jitter(&g, 0.05, 11).unwrap();
        let b = jitter(&g, 0.05, 11).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.halfedges(), g.halfedges());
        assert_eq!(a.inversions(), g.inversions());
        for (p, q) in a.positions().iter().zip(g.positions()) {
            assert!((p - q).amax() <= 0.05 + 1e-12);
        }
        assert_eq!(jitter(&g, 0.0, 3).unwrap().positions(), g.positions());
    }

    #[test]
    fn jitter_rejects_unusable_amplitudes() {
        let g = square_net().unwrap();
        for amplitude in [-1.0, f64::NAN, f64::INFINITY, 1e308, f64::MAX] {
            assert!(
                matches!(jitter(&g, amplitude, 0), Err(NetError::MalformedGraph { .. })),
                "{amplitude}"
            );
        }
        assert!(jitter(&g, 1e300, 0).is_ok());
    }
}

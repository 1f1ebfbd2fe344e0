//! Property tests over jittered fixtures: pairing, rotation totality, face
//! partition, orientation idempotence and stability of triviality.

use proptest::prelude::*;

use crate::cfg::NetCfg;
use crate::fixtures::{self, jitter};
use crate::graph::{HalfEdgeId, PeriodicGraph};
use crate::pipeline::reconstruct_surface;
use crate::orient::propagate_orientation;

/// Fixtures whose reconstruction succeeds, with the expected triviality.
fn reconstructible() -> Vec<(PeriodicGraph, bool)> {
    vec![
        (fixtures::square_net().unwrap(), true),
        (fixtures::triangular_net().unwrap(), true),
        (fixtures::skew_triangular_net().unwrap(), false),
        (fixtures::squashed_diamond_net().unwrap(), false),
        (fixtures::icosahedron().unwrap(), true),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn jittered_nets_keep_their_structure(seed in any::<u64>(), amplitude in 0.0f64..0.05) {
        for (base, trivial) in reconstructible() {
            let g = jitter(&base, amplitude, seed).unwrap();
            let s = reconstruct_surface(&g, NetCfg::default()).unwrap();

            // Rotation restricted to each vertex is one cycle through all its half-edges.
            for v in g.vertex_ids() {
                let mut cycle = s.rotation.around(&g, v);
                prop_assert_eq!(cycle.len(), g.degree(v));
                cycle.sort();
                prop_assert_eq!(cycle.as_slice(), g.outgoing(v));
            }

            // Faces partition the half-edges.
            let mut count = vec![0usize; g.num_halfedges()];
            for f in s.faces.faces() {
                for h in f.halfedges() {
                    count[h.0] += 1;
                }
            }
            prop_assert!(count.iter().all(|&c| c == 1));

            // Neighbouring normals agree and a second pass flips nothing.
            for he in g.halfedges() {
                prop_assert!(s.normals()[he.tail.0].dot(&s.normals()[he.head.0]) > 0.0);
            }
            let again = propagate_orientation(&g, s.normals().to_vec()).unwrap();
            prop_assert_eq!(again.flips, 0);

            prop_assert_eq!(s.triviality().is_trivial(), trivial);
        }
    }

    #[test]
    fn face_translations_sum_cells(seed in any::<u64>()) {
        let g = jitter(&fixtures::skew_triangular_net().unwrap(), 0.01, seed).unwrap();
        let s = reconstruct_surface(&g, NetCfg::default()).unwrap();
        for f in s.faces.faces() {
            let mut total = crate::graph::Cell::ZERO;
            for &h in f.halfedges() {
                total += g.halfedge(h).cell;
            }
            prop_assert_eq!(total, f.translation());
            prop_assert_eq!(f.offsets()[0], crate::graph::Cell::ZERO);
        }
        let first = s.faces.face_of(HalfEdgeId(0));
        prop_assert_eq!(first.0, 0);
    }
}

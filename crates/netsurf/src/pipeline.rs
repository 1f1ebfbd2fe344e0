//! End-to-end surface reconstruction: frames → orientation → rotation → faces.

use nalgebra::Vector3;
use tracing::info;

use crate::cfg::NetCfg;
use crate::error::NetError;
use crate::faces::{trace_faces, FaceSet, Triviality};
use crate::frame::{estimate_frames, LocalFrame};
use crate::graph::PeriodicGraph;
use crate::orient::{orient_frames, Orientation};
use crate::rotation::{build_rotation_system, RotationSystem};

/// Everything computed for one net.
#[derive(Clone, Debug)]
pub struct Surface {
    pub frames: Vec<LocalFrame>,
    pub orientation: Orientation,
    pub rotation: RotationSystem,
    pub faces: FaceSet,
}

impl Surface {
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.orientation.normals
    }

    #[inline]
    pub fn triviality(&self) -> Triviality {
        self.faces.triviality()
    }

    /// V − E + F of the quotient surface (0 for a trivial 2-periodic sheet,
    /// 2 for a closed sphere, negative for 3-periodic surfaces of higher genus).
    pub fn euler_characteristic(&self, graph: &PeriodicGraph) -> i64 {
        graph.num_vertices() as i64 - graph.num_edges() as i64 + self.faces.len() as i64
    }
}

/// Rotation system and faces from already oriented normals.
pub fn faces_from_normals(
    graph: &PeriodicGraph,
    normals: &[Vector3<f64>],
    cfg: NetCfg,
) -> Result<(RotationSystem, FaceSet), NetError> {
    let rotation = build_rotation_system(graph, normals, cfg)?;
    let faces = trace_faces(graph, &rotation)?;
    Ok((rotation, faces))
}

/// Run the whole pipeline; the first failing stage aborts the run.
pub fn reconstruct_surface(graph: &PeriodicGraph, cfg: NetCfg) -> Result<Surface, NetError> {
    let frames = estimate_frames(graph, cfg)?;
    let orientation = orient_frames(graph, &frames)?;
    let (rotation, faces) = faces_from_normals(graph, &orientation.normals, cfg)?;
    info!(
        vertices = graph.num_vertices(),
        halfedges = graph.num_halfedges(),
        faces = faces.len(),
        trivial = faces.triviality().is_trivial(),
        "surface reconstructed"
    );
    Ok(Surface {
        frames,
        orientation,
        rotation,
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::graph::{Cell, FaceId};

    #[test]
    fn icosahedron_is_a_trivial_sphere() {
        let g = fixtures::icosahedron().unwrap();
        let s = reconstruct_surface(&g, NetCfg::default()).unwrap();
        assert_eq!(s.faces.len(), 20);
        assert!(s.triviality().is_trivial());
        assert_eq!(s.euler_characteristic(&g), 2);
        for he in g.halfedges() {
            assert!(s.normals()[he.tail.0].dot(&s.normals()[he.head.0]) > 0.0);
        }
    }

    #[test]
    fn square_net_is_a_trivial_torus() {
        let g = fixtures::square_net().unwrap();
        let s = reconstruct_surface(&g, NetCfg::default()).unwrap();
        assert_eq!(s.faces.len(), 1);
        assert_eq!(s.faces.face(FaceId(0)).len(), 4);
        assert!(s.triviality().is_trivial());
        assert_eq!(s.euler_characteristic(&g), 0);
    }

    #[test]
    fn skew_net_reports_first_offending_face() {
        let g = fixtures::skew_triangular_net().unwrap();
        let s = reconstruct_surface(&g, NetCfg::default()).unwrap();
        assert_eq!(s.faces.len(), 2);
        assert_eq!(
            s.triviality(),
            Triviality::NonTrivial {
                face: FaceId(0),
                translation: Cell::new(1, 1, -1)
            }
        );
    }

    #[test]
    fn squashed_diamond_faces_climb_the_lattice() {
        let g = fixtures::squashed_diamond_net().unwrap();
        let s = reconstruct_surface(&g, NetCfg::default()).unwrap();
        for n in s.normals() {
            assert!(n.z.abs() > 1.0 - 1e-9);
        }
        assert_eq!(s.faces.len(), 2);
        assert!(s.faces.faces().iter().all(|f| f.len() == 4));
        let mut translations: Vec<[i32; 3]> =
            s.faces.faces().iter().map(|f| f.translation().0).collect();
        translations.sort();
        assert_eq!(translations, vec![[-1, -1, 1], [1, 1, -1]]);
        assert_eq!(
            s.triviality(),
            Triviality::NonTrivial {
                face: FaceId(0),
                translation: Cell::new(1, 1, -1)
            }
        );
        assert_eq!(s.euler_characteristic(&g), 0);
        // The climb is one period of the squashed lattice straight up z.
        let climb = Cell::new(1, 1, -1).to_ambient(g.periods());
        assert!((climb - Vector3::new(0.0, 0.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn underdetermined_vertex_aborts_the_run() {
        let g = PeriodicGraph::with_derived_inversions(
            nalgebra::Matrix3::identity(),
            vec![Vector3::zeros()],
            vec![
                crate::graph::HalfEdge::new(0, 0, Cell::new(0, 0, 1)),
                crate::graph::HalfEdge::new(0, 0, Cell::new(0, 0, -1)),
            ],
        )
        .unwrap();
        assert!(matches!(
            reconstruct_surface(&g, NetCfg::default()),
            Err(NetError::UnderdeterminedFrame { .. })
        ));
    }
}

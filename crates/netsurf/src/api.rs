//! Curated surface for driving code (CLI, benchmarks). Internal, not a
//! stability promise; breaking changes are fine when they improve the design.

// Model
pub use crate::graph::{derive_inversions, Cell, FaceId, HalfEdge, HalfEdgeId, PeriodicGraph, VertexId};
pub use crate::record::NetworkRecord;
// Stages
pub use crate::faces::{face_successor, trace_faces, Face, FaceSet, Triviality};
pub use crate::frame::{estimate_frame, estimate_frames, planarity_residual, spectrum, LocalFrame};
pub use crate::orient::{orient_frames, propagate_orientation, Orientation};
pub use crate::rotation::{build_rotation_system, rotation_at, RotationSystem};
// Checks and pipeline
pub use crate::diagnostics::{
    check_coplanarity, check_orthogonality, find_orthogonal_edge, Coplanarity, OrthogonalEdge,
};
pub use crate::pipeline::{faces_from_normals, reconstruct_surface, Surface};

//! Error types for net analysis.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::{HalfEdgeId, VertexId};

/// Errors raised while building or analysing a periodic net.
///
/// A face with nonzero net translation is not an error; see
/// [`crate::faces::Triviality`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetError {
    /// Inversion pairing is not a fixed-point-free involution, twins disagree
    /// on endpoints or cells, or an index is out of range.
    #[error("malformed graph: {reason}")]
    MalformedGraph {
        /// Human-readable description of the violated invariant.
        reason: String,
    },

    /// The incident displacement vectors do not span a plane.
    #[error("underdetermined frame at vertex {vertex} (degree {degree}, singular values {singular_values:?})")]
    UnderdeterminedFrame {
        vertex: VertexId,
        degree: usize,
        /// Singular values in descending order.
        singular_values: [f64; 3],
    },

    /// Two traversal paths demand opposite normal signs for `vertex`.
    #[error(
        "inconsistent orientation at vertex {vertex} (reached from {from}): {normal_from:?} · {normal_to:?} = {dot}"
    )]
    InconsistentOrientation {
        vertex: VertexId,
        from: VertexId,
        normal_from: [f64; 3],
        normal_to: [f64; 3],
        dot: f64,
    },

    /// An incident edge projects to (almost) nothing on the tangent plane.
    #[error("degenerate rotation at vertex {vertex}: half-edge {halfedge} is parallel to the normal")]
    DegenerateRotation {
        vertex: VertexId,
        halfedge: HalfEdgeId,
    },

    /// Reading or writing a record failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be (de)serialized.
    #[error("invalid network record: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGraph {
            reason: reason.into(),
        }
    }
}

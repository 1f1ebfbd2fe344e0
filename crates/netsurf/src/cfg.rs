//! Tolerance defaults for net analysis.
//!
//! Policy
//! - Defaults are fixed constants; callers that need a different tolerance pass
//!   a modified `NetCfg` instead of editing call sites.

/// Coplanarity/orthogonality tolerance τ (smallest singular value, |n_a·n_b|).
pub(crate) const TOL: f64 = 1e-3;
/// Relative threshold on the second singular value below which the local
/// normal is considered unidentifiable.
pub(crate) const RANK_EPS: f64 = 1e-9;
/// Relative threshold on a projected edge length below which the edge is
/// considered parallel to the normal.
pub(crate) const PROJ_EPS: f64 = 1e-9;

/// Net analysis configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetCfg {
    pub tol: f64,
    pub eps_rank: f64,
    pub eps_proj: f64,
}

impl Default for NetCfg {
    fn default() -> Self {
        Self {
            tol: TOL,
            eps_rank: RANK_EPS,
            eps_proj: PROJ_EPS,
        }
    }
}

impl NetCfg {
    /// Same configuration with a different coplanarity/orthogonality tolerance.
    #[inline]
    pub fn with_tol(self, tol: f64) -> Self {
        Self { tol, ..self }
    }
}

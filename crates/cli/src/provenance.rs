//! `<stem>.provenance.json` sidecars for every file the CLI writes: which
//! command produced it, from which network record, at what tolerance, and the
//! size of the net it describes.

use anyhow::{Context, Result};
use netsurf::api::{FaceSet, PeriodicGraph};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Size of the net behind an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub vertices: usize,
    pub halfedges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<usize>,
}

impl Counts {
    pub fn of(graph: &PeriodicGraph) -> Self {
        Self {
            vertices: graph.num_vertices(),
            halfedges: graph.num_halfedges(),
            faces: None,
        }
    }

    pub fn with_faces(self, faces: &FaceSet) -> Self {
        Self {
            faces: Some(faces.len()),
            ..self
        }
    }
}

/// What a command knows about the artifact it just wrote.
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<bool>,
    pub counts: Counts,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl<'a> Payload<'a> {
    pub fn new(command: &'static str, counts: Counts) -> Self {
        Self {
            command,
            input: None,
            tol: None,
            verdict: None,
            counts,
            params: Value::Null,
        }
    }

    pub fn input(mut self, path: &'a Path) -> Self {
        self.input = Some(path);
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn verdict(mut self, ok: bool) -> Self {
        self.verdict = Some(ok);
        self
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Sidecar<'p, 'a> {
    code_rev: String,
    netsurf_version: &'static str,
    callsite: Callsite,
    #[serde(flatten)]
    payload: &'p Payload<'a>,
    outputs: Vec<String>,
}

/// Write the sidecar for `artifact` and return its path.
#[track_caller]
pub fn write_sidecar(artifact: &Path, payload: &Payload<'_>) -> Result<PathBuf> {
    let caller = Location::caller();
    let sidecar = Sidecar {
        code_rev: current_git_rev(),
        netsurf_version: netsurf::VERSION,
        callsite: Callsite {
            file: caller.file(),
            line: caller.line(),
        },
        payload,
        outputs: vec![artifact.display().to_string()],
    };
    let path = sidecar_path(artifact);
    fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(sidecar = %path.display(), command = payload.command, "provenance written");
    Ok(path)
}

/// `dir/surface_data.json` → `dir/surface_data.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map_or_else(|| "artifact".into(), |s| s.to_string_lossy());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use netsurf::api::{
    check_coplanarity, check_orthogonality, estimate_frame, estimate_frames, faces_from_normals,
    orient_frames, spectrum, Coplanarity, NetworkRecord, PeriodicGraph, Triviality,
};
use netsurf::{fixtures, NetCfg, NetError};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{write_sidecar, Counts, Payload};

#[derive(Parser)]
#[command(name = "netsurf")]
#[command(about = "Face reconstruction and geometry checks for 3-periodic nets")]
struct Cmd {
    /// Coplanarity/orthogonality tolerance
    #[arg(long, global = true, default_value_t = NetCfg::default().tol)]
    tol: f64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Fit and orient vertex normals; on success store them in the record
    Orient {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to rewriting the input record
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Trace faces; if every face is trivial write the surface record
    Faces {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Are all vertices of degree > 3 locally coplanar?
    Coplanar {
        #[arg(long)]
        input: PathBuf,
    },
    /// Does some edge join two vertices with orthogonal normals?
    Orthogonal {
        #[arg(long)]
        input: PathBuf,
    },
    /// Per-vertex frame table (.csv or .parquet)
    Frames {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write a hand-built network record
    Fixture {
        #[arg(long)]
        name: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    let cfg = NetCfg::default().with_tol(cmd.tol);
    match cmd.action {
        Action::Orient { input, out } => {
            let out = out.unwrap_or_else(|| input.clone());
            print_verdict(orient(&input, &out, cfg)?)
        }
        Action::Faces { input, out } => print_verdict(faces(&input, &out, cfg)?),
        Action::Coplanar { input } => print_verdict(coplanar(&input, cfg)?),
        Action::Orthogonal { input } => print_verdict(orthogonal(&input, cfg)?),
        Action::Frames { input, out } => frames(&input, &out, cfg),
        Action::Fixture {
            name,
            out,
            jitter,
            seed,
        } => fixture(&name, &out, jitter, seed),
        Action::Report => report(),
    }
}

fn print_verdict(ok: bool) -> Result<()> {
    println!("{ok}");
    Ok(())
}

fn load(input: &Path) -> Result<(NetworkRecord, PeriodicGraph)> {
    let record = NetworkRecord::read(input)?;
    let graph = record
        .to_graph()
        .with_context(|| format!("validating {}", input.display()))?;
    tracing::info!(
        input = %input.display(),
        vertices = graph.num_vertices(),
        halfedges = graph.num_halfedges(),
        "loaded network"
    );
    Ok((record, graph))
}

/// Geometric failures become a `false` verdict with a diagnostic; everything
/// else is a hard error.
fn geometric_failure(err: NetError) -> Result<bool> {
    match err {
        NetError::UnderdeterminedFrame { .. }
        | NetError::InconsistentOrientation { .. }
        | NetError::DegenerateRotation { .. } => {
            tracing::warn!(%err, "check failed");
            eprintln!("{err}");
            Ok(false)
        }
        other => Err(other.into()),
    }
}

fn orient(input: &Path, out: &Path, cfg: NetCfg) -> Result<bool> {
    let (mut record, graph) = load(input)?;
    let orientation = match estimate_frames(&graph, cfg).and_then(|f| orient_frames(&graph, &f)) {
        Ok(o) => o,
        Err(e) => return geometric_failure(e),
    };
    tracing::info!(
        flips = orientation.flips,
        components = orientation.roots.len(),
        "orientation consistent"
    );
    record.set_normals(&orientation.normals);
    record.write(out)?;
    let payload = Payload::new("orient", Counts::of(&graph))
        .input(input)
        .tol(cfg.tol)
        .verdict(true)
        .params(serde_json::json!({ "flips": orientation.flips, "components": orientation.roots.len() }));
    write_sidecar(out, &payload)?;
    Ok(true)
}

fn faces(input: &Path, out: &Path, cfg: NetCfg) -> Result<bool> {
    let (mut record, graph) = load(input)?;
    let normals = match record.normals()? {
        Some(n) => n,
        None => {
            tracing::info!("record has no normals; fitting and orienting");
            match estimate_frames(&graph, cfg).and_then(|f| orient_frames(&graph, &f)) {
                Ok(o) => o.normals,
                Err(e) => return geometric_failure(e),
            }
        }
    };
    let (_rotation, faces) = match faces_from_normals(&graph, &normals, cfg) {
        Ok(r) => r,
        Err(e) => return geometric_failure(e),
    };
    match faces.triviality() {
        Triviality::Trivial => {
            tracing::info!(faces = faces.len(), "all faces trivial");
            record.normals.clear();
            record.set_faces(&faces);
            record.write(out)?;
            let payload = Payload::new("faces", Counts::of(&graph).with_faces(&faces))
                .input(input)
                .tol(cfg.tol)
                .verdict(true);
            write_sidecar(out, &payload)?;
            Ok(true)
        }
        Triviality::NonTrivial { face, translation } => {
            let walk: Vec<usize> = faces.face(face).halfedges().iter().map(|h| h.0).collect();
            tracing::warn!(%face, %translation, ?walk, "face does not close in the lattice");
            eprintln!("face {face} {walk:?} has net translation {translation}");
            Ok(false)
        }
    }
}

fn coplanar(input: &Path, cfg: NetCfg) -> Result<bool> {
    let (_, graph) = load(input)?;
    match check_coplanarity(&graph, cfg) {
        Coplanarity::Coplanar => Ok(true),
        Coplanarity::NonCoplanar { vertex, residual } => {
            tracing::warn!(%vertex, residual, tol = cfg.tol, "neighbours not coplanar");
            eprintln!("vertex {vertex}: smallest singular value {residual:e} > {:e}", cfg.tol);
            Ok(false)
        }
    }
}

fn orthogonal(input: &Path, cfg: NetCfg) -> Result<bool> {
    let (_, graph) = load(input)?;
    match check_orthogonality(&graph, cfg)? {
        Some(w) => {
            tracing::info!(halfedge = %w.halfedge, tail = %w.tail, head = %w.head, dot = w.dot, "orthogonal edge");
            eprintln!(
                "half-edge {} joins {} and {} with normal dot {:e}",
                w.halfedge, w.tail, w.head, w.dot
            );
            Ok(true)
        }
        None => Ok(false),
    }
}

fn frames(input: &Path, out: &Path, cfg: NetCfg) -> Result<()> {
    let (_, graph) = load(input)?;
    let n = graph.num_vertices();
    let mut vertex = Vec::with_capacity(n);
    let mut degree = Vec::with_capacity(n);
    let mut s = [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
    let mut normal: [Vec<Option<f64>>; 3] =
        [Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n)];
    for v in graph.vertex_ids() {
        let sp = spectrum(&graph, v);
        let fitted = estimate_frame(&graph, v, cfg).ok();
        vertex.push(v.0 as u32);
        degree.push(graph.degree(v) as u32);
        for k in 0..3 {
            s[k].push(sp.singular_values[k]);
            normal[k].push(fitted.map(|f| f.normal[k]));
        }
    }
    let [s1, s2, s3] = s;
    let [nx, ny, nz] = normal;
    let mut df = polars::df!(
        "vertex" => vertex,
        "degree" => degree,
        "s1" => s1,
        "s2" => s2,
        "residual" => s3,
        "nx" => nx,
        "ny" => ny,
        "nz" => nz
    )?;
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    match out.extension().and_then(|e| e.to_str()) {
        Some("parquet") => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
        Some("csv") => CsvWriter::new(&mut file).finish(&mut df)?,
        other => bail!("unsupported table extension {other:?} (use .csv or .parquet)"),
    }
    tracing::info!(rows = df.height(), out = %out.display(), "frame table written");
    let payload = Payload::new("frames", Counts::of(&graph))
        .input(input)
        .tol(cfg.tol)
        .params(serde_json::json!({ "rows": df.height() }));
    write_sidecar(out, &payload)?;
    Ok(())
}

fn fixture(name: &str, out: &Path, jitter: f64, seed: u64) -> Result<()> {
    let Some(graph) = fixtures::by_name(name) else {
        bail!("unknown fixture {name:?}; known: {}", fixtures::NAMES.join(", "));
    };
    let graph = fixtures::jitter(&graph?, jitter, seed)?;
    let mut record = NetworkRecord::from_graph(&graph);
    record
        .extra
        .insert("fixture".to_string(), serde_json::Value::from(name));
    record.write(out)?;
    let payload = Payload::new("fixture", Counts::of(&graph))
        .params(serde_json::json!({ "name": name, "jitter": jitter, "seed": seed }));
    write_sidecar(out, &payload)?;
    tracing::info!(name, out = %out.display(), "fixture written");
    Ok(())
}

#[derive(Serialize)]
struct Report {
    code_rev: String,
    netsurf_version: &'static str,
    default_tol: f64,
    fixtures: &'static [&'static str],
}

fn report() -> Result<()> {
    let obj = Report {
        code_rev: provenance::current_git_rev(),
        netsurf_version: netsurf::VERSION,
        default_tol: NetCfg::default().tol,
        fixtures: &fixtures::NAMES,
    };
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

//! Command line entry point for the boiling-case visualizer.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use boilviz::anim::{assemble_gif, select_stride};
use boilviz::case::{Case, Timestep, ALPHA_FIELD, TEMP_FIELD};
use boilviz::config::{self, Config};
use boilviz::foam::load_field;
use boilviz::grid::{Field3, Grid};
use boilviz::paraview::ParaviewJob;
use boilviz::render::{cloud, data_range, slice};

/// Temperature window used when the fields carry no finite spread, matching
/// a saturated pool at 1 atm.
const FALLBACK_TEMP_RANGE: (f64, f64) = (300.0, 373.15);

/// Camera azimuth for the fixed-view cloud renders.
const DEFAULT_AZIMUTH: f64 = 45.0;

/// Render animations and stills from a two-phase boiling OpenFOAM case
///
/// Timestep directories are discovered under the case root by name; each
/// must contain both the alpha.water and T field files to count.
#[derive(Parser)]
#[command(name = "boilviz", version, about, verbatim_doc_comment)]
struct Cli {
    /// OpenFOAM case directory
    #[arg(long, global = true, default_value = ".")]
    case: PathBuf,

    /// YAML config file (defaults to boilviz.yaml when present)
    #[arg(long, global = true, value_name = "file")]
    config: Option<PathBuf>,

    /// Fail on malformed field files instead of recovering with warnings
    #[arg(long, global = true)]
    strict: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything below errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the usable timesteps found in the case
    Scan,

    /// Render a single frame to PNG
    Still {
        /// Simulation time to render, nearest match wins (default: last)
        #[arg(long)]
        time: Option<f64>,
        /// Output path
        #[arg(short, long, default_value = "still.png")]
        out: PathBuf,
        /// Render the 3D point cloud instead of the slice panels
        #[arg(long)]
        cloud: bool,
    },

    /// Animated GIF of the slice panels over time
    SliceGif {
        #[arg(short, long, default_value = "boiling_slice.gif")]
        out: PathBuf,
    },

    /// Animated GIF of the 3D point cloud over time
    CloudGif {
        #[arg(short, long, default_value = "boiling_cloud.gif")]
        out: PathBuf,
    },

    /// Animated GIF orbiting the cloud of a single timestep
    RotateGif {
        /// Simulation time to orbit, nearest match wins (default: middle)
        #[arg(long)]
        time: Option<f64>,
        #[arg(short, long, default_value = "boiling_rotate.gif")]
        out: PathBuf,
    },

    /// Drive ParaView for a full-quality render of the case
    Paraview {
        #[arg(short, long, default_value = "boiling_paraview.gif")]
        out: PathBuf,
        /// Keep every Nth velocity glyph
        #[arg(long, default_value_t = 5, value_name = "n")]
        glyph_stride: usize,
        /// Write the pvpython script without running it
        #[arg(long)]
        script_only: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging_init(cli.verbose, cli.quiet);

    let cfg = config::load(cli.config.as_deref());
    let grid = cfg.grid();
    let case = Case::new(&cli.case);

    match cli.command {
        Cmd::Scan => cmd_scan(&case),
        Cmd::Still { time, out, cloud } => {
            cmd_still(&case, &cfg, &grid, cli.strict, time, &out, cloud)
        }
        Cmd::SliceGif { out } => cmd_slice_gif(&case, &cfg, &grid, cli.strict, &out),
        Cmd::CloudGif { out } => cmd_cloud_gif(&case, &cfg, &grid, cli.strict, &out),
        Cmd::RotateGif { time, out } => cmd_rotate_gif(&case, &cfg, &grid, cli.strict, time, &out),
        Cmd::Paraview {
            out,
            glyph_stride,
            script_only,
        } => cmd_paraview(&case, &cfg, glyph_stride, script_only, &out),
    }
}

fn logging_init(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

struct Fields {
    alpha: Field3,
    temp: Field3,
}

fn load_step(
    case: &Case,
    step: &Timestep,
    grid: &Grid,
    strict: bool,
) -> std::result::Result<Fields, boilviz::VizError> {
    let dir = step.dir(case);
    Ok(Fields {
        alpha: load_field(&dir, ALPHA_FIELD, grid, strict)?,
        temp: load_field(&dir, TEMP_FIELD, grid, strict)?,
    })
}

/// Temperature window over all selected timesteps, so animation colors hold
/// still while the field evolves. Falls back to the saturation window when
/// no finite spread exists.
fn shared_temp_range(
    case: &Case,
    steps: &[&Timestep],
    grid: &Grid,
    strict: bool,
) -> Result<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for step in steps {
        let temp = load_field(&step.dir(case), TEMP_FIELD, grid, strict)?;
        if let Some((a, b)) = data_range(temp.values()) {
            lo = lo.min(a);
            hi = hi.max(b);
        }
    }
    if lo.is_finite() && hi > lo {
        Ok((lo, hi))
    } else {
        Ok(FALLBACK_TEMP_RANGE)
    }
}

fn pick_step<'a>(steps: &'a [Timestep], want: Option<f64>, default: usize) -> Result<&'a Timestep> {
    match want {
        Some(t) => Case::nearest(steps, t).ok_or_else(|| anyhow!("no timesteps to pick from")),
        None => steps
            .get(default)
            .ok_or_else(|| anyhow!("no timesteps to pick from")),
    }
}

fn cmd_scan(case: &Case) -> Result<()> {
    let steps = case.scan_required()?;
    println!("{} timesteps under {}", steps.len(), case.root().display());
    for step in &steps {
        println!("  {:>12}  t={:.6}s", step.name, step.time);
    }
    Ok(())
}

fn cmd_still(
    case: &Case,
    cfg: &Config,
    grid: &Grid,
    strict: bool,
    time: Option<f64>,
    out: &Path,
    cloud: bool,
) -> Result<()> {
    let steps = case.scan_required()?;
    let step = pick_step(&steps, time, steps.len() - 1)?;
    info!("rendering t={}s from {}", step.time, step.name);

    let fields = load_step(case, step, grid, strict)?;
    let range = data_range(fields.temp.values()).unwrap_or(FALLBACK_TEMP_RANGE);
    let raster = if cloud {
        cloud::render_cloud(
            &fields.alpha,
            &fields.temp,
            grid,
            &cfg.render,
            step.time,
            range,
            DEFAULT_AZIMUTH,
        )
    } else {
        slice::render_slice(&fields.alpha, &fields.temp, grid, &cfg.render, step.time, range)
    };
    raster.to_image().save(out)?;
    println!("wrote {}", out.display());
    Ok(())
}

fn cmd_slice_gif(case: &Case, cfg: &Config, grid: &Grid, strict: bool, out: &Path) -> Result<()> {
    let steps = case.scan_required()?;
    let stride = select_stride(steps.len(), cfg.animation.max_frames);
    let selected: Vec<&Timestep> = steps.iter().step_by(stride).collect();
    info!("{} of {} timesteps selected (stride {})", selected.len(), steps.len(), stride);

    let range = shared_temp_range(case, &selected, grid, strict)?;
    let frames = assemble_gif(selected, out, cfg.animation.fps, |step| {
        let fields = load_step(case, step, grid, strict)?;
        Ok(slice::render_slice(
            &fields.alpha,
            &fields.temp,
            grid,
            &cfg.render,
            step.time,
            range,
        ))
    })?;
    println!("wrote {} ({frames} frames)", out.display());
    Ok(())
}

fn cmd_cloud_gif(case: &Case, cfg: &Config, grid: &Grid, strict: bool, out: &Path) -> Result<()> {
    let steps = case.scan_required()?;
    let stride = select_stride(steps.len(), cfg.animation.max_frames);
    let selected: Vec<&Timestep> = steps.iter().step_by(stride).collect();
    info!("{} of {} timesteps selected (stride {})", selected.len(), steps.len(), stride);

    let range = shared_temp_range(case, &selected, grid, strict)?;
    let frames = assemble_gif(selected, out, cfg.animation.fps, |step| {
        let fields = load_step(case, step, grid, strict)?;
        Ok(cloud::render_cloud(
            &fields.alpha,
            &fields.temp,
            grid,
            &cfg.render,
            step.time,
            range,
            DEFAULT_AZIMUTH,
        ))
    })?;
    println!("wrote {} ({frames} frames)", out.display());
    Ok(())
}

fn cmd_rotate_gif(
    case: &Case,
    cfg: &Config,
    grid: &Grid,
    strict: bool,
    time: Option<f64>,
    out: &Path,
) -> Result<()> {
    let steps = case.scan_required()?;
    let step = pick_step(&steps, time, steps.len() / 2)?;
    info!("orbiting t={}s from {}", step.time, step.name);

    let fields = load_step(case, step, grid, strict)?;
    let range = data_range(fields.temp.values()).unwrap_or(FALLBACK_TEMP_RANGE);
    let n = cfg.animation.rotate_frames.max(1);
    let frames = assemble_gif(0..n, out, cfg.animation.fps, |i| {
        let azimuth = 360.0 * i as f64 / n as f64;
        Ok(cloud::render_cloud(
            &fields.alpha,
            &fields.temp,
            grid,
            &cfg.render,
            step.time,
            range,
            azimuth,
        ))
    })?;
    println!("wrote {} ({frames} frames)", out.display());
    Ok(())
}

fn cmd_paraview(
    case: &Case,
    cfg: &Config,
    glyph_stride: usize,
    script_only: bool,
    out: &Path,
) -> Result<()> {
    let steps = case.scan_required()?;
    let job = ParaviewJob {
        case_root: case.root().to_path_buf(),
        frames_dir: case.root().join("animation_frames"),
        view_size: (1200, 800),
        glyph_stride,
    };

    if script_only {
        let script = case.root().join("boilviz_paraview.py");
        job.ensure_case_stub()?;
        job.write_script(&script, steps.len())?;
        println!("wrote {}", script.display());
        return Ok(());
    }

    job.run(steps.len())?;
    let tool = job.assemble_frames(out, cfg.animation.fps)?;
    println!("wrote {} (assembled with {tool})", out.display());
    Ok(())
}

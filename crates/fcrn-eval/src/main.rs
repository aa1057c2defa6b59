//! FCRN Evaluation - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use fcrn_eval::{evaluate_real, evaluate_sim, init_logging, visualize, EvalConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "fcrn-eval",
    version,
    about = "Evaluate an FCRN tactile height-map checkpoint on real or simulated data"
)]
struct Cli {
    /// TOML configuration file; FCRN_* environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// ONNX checkpoint (overrides model.checkpoint).
    #[arg(long, global = true)]
    checkpoint: Option<String>,
    /// Output directory (overrides output.dir).
    #[arg(long, global = true)]
    output_dir: Option<String>,
    /// Raise log verbosity; repeat for more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Log as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict on real sensor images and write per-sample artifacts.
    Real {
        /// Image manifest (overrides manifests.real).
        #[arg(long)]
        manifest: Option<String>,
    },
    /// Predict on simulated images and write the RMSE/IoU summary.
    Sim {
        /// Image manifest (overrides manifests.sim_data).
        #[arg(long)]
        data_manifest: Option<String>,
        /// Label manifest (overrides manifests.sim_labels).
        #[arg(long)]
        label_manifest: Option<String>,
    },
    /// Render height-field/mask directory pairs as 3D surface snapshots.
    Visualize {
        #[arg(long)]
        heightmaps: PathBuf,
        #[arg(long)]
        masks: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Physical size of one pixel (overrides render.scale).
        #[arg(long)]
        scale: Option<f32>,
        /// Height per stored luma unit.
        #[arg(long, default_value_t = 1.0)]
        value_scale: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EvalConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.checkpoint.is_some() {
        config.model.checkpoint = cli.checkpoint;
    }
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    init_logging(&config.logging, cli.verbose)?;

    info!("=== FCRN evaluation v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Real { manifest } => {
            if manifest.is_some() {
                config.manifests.real = manifest;
            }
            let report = evaluate_real(&config).context("real-data evaluation failed")?;
            info!("Processed {} samples in {} batches", report.samples, report.batches);
        }
        Command::Sim {
            data_manifest,
            label_manifest,
        } => {
            if data_manifest.is_some() {
                config.manifests.sim_data = data_manifest;
            }
            if label_manifest.is_some() {
                config.manifests.sim_labels = label_manifest;
            }
            let summary = evaluate_sim(&config).context("sim-data evaluation failed")?;
            println!("{}", summary.summary_line());
        }
        Command::Visualize {
            heightmaps,
            masks,
            out,
            scale,
            value_scale,
        } => {
            if let Some(scale) = scale {
                config.render.scale = scale;
            }
            visualize(&config, &heightmaps, &masks, &out, value_scale)
                .context("surface export failed")?;
        }
    }

    Ok(())
}

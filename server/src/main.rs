use anyhow::Context;
use antcore::AnalysisMode;
use clap::Parser;
use generator::profile::{build_logs, GeneratorConfig};
use log::{info, warn};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use web::bridge::WebBridge;
use workflow::config::ServerConfig;
use workflow::runner::Runner;

mod charts;
mod generator;
mod web;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Compare antennas from parallel ADIF logs")]
struct Args {
    /// Load the server config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// transmission or reception
    #[arg(long)]
    mode: Option<AnalysisMode>,
    /// Analyze --files once and write the charts to --out-dir
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, num_args = 1.., value_name = "FILE")]
    files: Vec<PathBuf>,
    #[arg(long, default_value = "analysis")]
    out_dir: PathBuf,
    /// Write synthetic per-antenna ADIF logs into this directory and exit
    #[arg(long, value_name = "DIR")]
    synthetic: Option<PathBuf>,
    #[arg(long, default_value_t = 3)]
    antennas: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn write_synthetic(dir: &Path, antennas: usize, seed: u64) -> anyhow::Result<()> {
    let config = GeneratorConfig {
        antennas,
        seed,
        ..Default::default()
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for log in build_logs(&config)? {
        let path = dir.join(log.file_name());
        fs::write(&path, &log.content).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn run_offline(runner: &Runner, files: &[PathBuf], out_dir: &Path) -> anyhow::Result<()> {
    let mode = runner.config().default_mode;
    let report = runner.analyze_paths(files, mode)?;

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    for (name, chart) in report.charts() {
        match chart {
            Some(image) => {
                let path = out_dir.join(format!("{}.{}", name, image.extension()));
                fs::write(&path, &image.data)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("{} -> {}", name, path.display());
            }
            None => println!("{} -> no data", name),
        }
    }

    let metrics = runner.metrics();
    println!(
        "Offline run ({}) -> files {}, records {}, dropped files {}",
        mode,
        files.len(),
        metrics.records_ingested,
        metrics.files_dropped
    );
    Ok(())
}

fn serve(runner: Runner) -> anyhow::Result<()> {
    let bridge = WebBridge::new(Arc::new(runner));
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for the HTTP server")?;
    runtime.block_on(bridge.serve(async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("ctrl-c handler failed: {}", err);
        }
        info!("shutdown requested");
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(dir) = &args.synthetic {
        return write_synthetic(dir, args.antennas, args.seed);
    }

    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?.with_overrides(args.bind, args.mode),
        None => ServerConfig::from_args(args.bind, args.mode),
    };
    let runner = Runner::new(config);

    if args.offline {
        return run_offline(&runner, &args.files, &args.out_dir);
    }
    serve(runner)
}

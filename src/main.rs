use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod clusters;
mod config;
mod models;


use crate::clusters::{ClusterPipeline, FileSource, NetworkVizConfig};
use crate::config::load_config;

#[derive(Parser)]
#[command(name = "artist-clusters")]
#[command(about = "Summary statistics and network visualizations for Spotify artist-track clusters")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Root of the data directory (defaults to $CLUSTER_DATA_DIR, then `data`)
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file with network visualization variants, replacing the built-in ones
    #[arg(short = 'c', long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// Write the TSV reports only, skipping every PNG
    #[arg(long = "skip-images", global = true)]
    skip_images: bool,

    /// Quiet mode - only log warnings and errors
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Join edges with track metadata and write per-artist popularity statistics
    Summary,
    /// Render the top-20 and top-5 artist networks
    Network,
    /// Render the sampled top-3 network and its dashboard
    Clean,
    /// Run every job (default)
    All,
}

fn init_tracing(quiet: bool) {
    let level = if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let config = load_config(args.data_dir.clone())?;
    let paths = config.paths();
    let command = args.command.unwrap_or(Command::All);
    info!(
        "Starting artist-clusters v{} at {} (data: {})",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        config.data_dir.display()
    );

    let network_variants = match &args.config_file {
        Some(path) => {
            let variants = NetworkVizConfig::load_all_from_file(path)?;
            info!(
                "Loaded {} visualization variants from {}",
                variants.len(),
                path.display()
            );
            variants
        }
        None => NetworkVizConfig::network_defaults(),
    };

    let source = FileSource::new(&paths);
    let pipeline = ClusterPipeline::new(paths, !args.skip_images);

    if matches!(command, Command::Summary | Command::All) {
        println!("\n=== SUMMARY STATISTICS ===");
        pipeline.run_summary(&source)?;
    }

    if matches!(command, Command::Network | Command::All) {
        println!("\n=== NETWORK VISUALIZATIONS ===");
        for scene in pipeline.run_network(&source, &network_variants)? {
            println!(
                "{} artists, {} nodes, {} edges",
                scene.ranked.len(),
                scene.graph.node_count(),
                scene.graph.edge_count()
            );
        }
    }

    if matches!(command, Command::Clean | Command::All) {
        println!("\n=== CLEAN VISUALIZATION ===");
        let (scene, dashboard) = pipeline.run_clean(&source, &NetworkVizConfig::clean())?;
        let artists: Vec<&str> = scene.ranked.iter().map(|a| a.artist.as_str()).collect();
        println!("Top {} artists: {}", artists.len(), artists.join(", "));
        for line in dashboard.statistics_lines() {
            println!("{line}");
        }
    }

    Ok(())
}

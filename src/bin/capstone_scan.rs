use clap::{Parser, Subcommand};
use qr_capstone::tools::{grayscale_stats, grid_stats, load_grayscale, save_grid_png};
use qr_capstone::{ScanConfig, ScanContext, ScanError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capstone_scan", version, about = "QR capstone detection tools")]
struct Cli {
    /// Use this threshold instead of Otsu's
    #[arg(long, global = true)]
    threshold: Option<u8>,
    /// Scan rows on a single thread
    #[arg(long, global = true)]
    sequential: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find capstones in an image and print them
    Detect {
        #[arg(long)]
        image: PathBuf,
    },
    /// Write the labeled pixel grid of an image after detection
    Dump {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ScanConfig::from_env();
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    if cli.sequential {
        config = config.with_parallel_rows(false);
    }

    let result = match &cli.command {
        Command::Detect { image } => detect_cmd(image, config),
        Command::Dump { image, out } => dump_cmd(image, out, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "capstone scan failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn scan(image: &Path, config: ScanConfig) -> Result<ScanContext, ScanError> {
    let (gray, width, height) = load_grayscale(image)?;
    let stats = grayscale_stats(&gray);
    println!("Image: {} ({}x{})", image.display(), width, height);
    println!(
        "Grayscale range: {}-{}, average: {}",
        stats.min, stats.max, stats.avg
    );

    let mut ctx = ScanContext::new(width, height, config)?;
    let start = Instant::now();
    ctx.identify(&gray)?;
    println!("Scan time: {:.2?}", start.elapsed());
    Ok(ctx)
}

fn detect_cmd(image: &Path, config: ScanConfig) -> Result<(), ScanError> {
    let ctx = scan(image, config)?;
    let telemetry = ctx.telemetry();

    println!("Threshold: {}", telemetry.threshold);
    println!(
        "Candidates: {} (recorded={} duplicate={} rejected={} unresolved={})",
        telemetry.candidates,
        telemetry.capstones_recorded,
        telemetry.duplicates,
        telemetry.rejected,
        telemetry.unresolved
    );
    println!(
        "Regions: {}{}",
        telemetry.regions_allocated,
        if telemetry.regions_saturated { " (table full)" } else { "" }
    );
    if telemetry.capstones_saturated {
        println!("Capstone table full, some capstones were dropped");
    }
    if telemetry.fill_overflows > 0 {
        println!("Flood fills cut short: {}", telemetry.fill_overflows);
    }

    println!("Found {} capstones", ctx.capstones().len());
    for (i, cap) in ctx.capstones().iter().enumerate() {
        let ring = ctx.regions().get(cap.ring).map_or(0, |r| r.count);
        let stone = ctx.regions().get(cap.stone).map_or(0, |r| r.count);
        println!(
            "  Capstone {}: center=({:.1}, {:.1}) ring={}px stone={}px corners={:?}",
            i,
            cap.center.x,
            cap.center.y,
            ring,
            stone,
            cap.corners.map(|p| (p.x, p.y))
        );
    }
    Ok(())
}

fn dump_cmd(image: &Path, out: &Path, config: ScanConfig) -> Result<(), ScanError> {
    let ctx = scan(image, config)?;
    let stats = grid_stats(ctx.grid());
    println!(
        "Grid: white={} black={} labeled={} black_ratio={:.2}%",
        stats.white_pixels,
        stats.black_pixels,
        stats.region_pixels,
        stats.black_ratio() * 100.0
    );
    save_grid_png(ctx.grid(), out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

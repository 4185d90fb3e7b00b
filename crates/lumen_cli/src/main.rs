//! Lumen command line renderer.
//!
//! Reads a JSON scene description, renders it and writes a PNG.

mod scene_file;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lumen_tracer::{render, ImageBuffer};

use scene_file::SceneFile;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Render a CSG scene description to a PNG", long_about = None)]
struct Cli {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image path (overrides the scene's `output`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads (0 = all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Average a 3x3 grid of samples per pixel
    #[arg(long)]
    supersample: bool,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Seed for area-light sampling
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let file = SceneFile::from_path(&cli.scene)?;
    let base_dir = cli.scene.parent().unwrap_or(Path::new("."));
    let mut loaded = file.build(base_dir)?;

    if let Some(threads) = cli.threads {
        loaded.settings.threads = threads;
    }
    if cli.supersample {
        loaded.settings.supersample = true;
    }
    if let Some(seed) = cli.seed {
        loaded.settings.seed = seed;
    }
    let width = cli.width.unwrap_or(loaded.width);
    let height = cli.height.unwrap_or(loaded.height);
    let output = cli.output.unwrap_or(loaded.output);

    let mut image = ImageBuffer::new(width, height);
    let stats = render(&mut loaded.scene, &mut image, &loaded.settings)
        .with_context(|| format!("Failed to render {}", cli.scene.display()))?;

    for (worker, rows) in stats.rows_per_worker.iter().enumerate() {
        log::debug!("Worker {} rendered {} rows", worker, rows.len());
    }

    image::save_buffer(
        &output,
        &image.to_rgb8(),
        width,
        height,
        image::ColorType::Rgb8,
    )
    .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} ({} rows in {:.2?})",
        output.display(),
        stats.rows_rendered(),
        stats.elapsed
    );

    Ok(())
}

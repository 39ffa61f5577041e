mod batch;
mod codec;
mod error;
mod imaging;
mod state;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;

use crate::codec::metadata::format_file_size;
use crate::codec::OutputFormat;
use crate::imaging::FilterKind;
use crate::state::{DirectoryBrowser, EditCommand, EditSession, Outcome, Settings};

#[derive(Parser)]
#[command(name = "heic-viewer", version, about = "HEIC/HEIF viewer and converter")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Image to inspect (prints dimensions, format and EXIF)
    image: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a single image, optionally editing it on the way
    Convert(ConvertArgs),
    /// Convert many images into one output directory
    Batch(BatchArgs),
    /// Show recently opened files
    Recent,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input image
    input: PathBuf,

    /// Output file; the extension decides the format
    #[arg(short, long)]
    output: PathBuf,

    /// JPEG quality, 1-100 (defaults to the saved setting)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Rotate 90 degrees counter-clockwise (repeatable)
    #[arg(long, action = clap::ArgAction::Count)]
    rotate_left: u8,

    /// Rotate 90 degrees clockwise (repeatable)
    #[arg(long, action = clap::ArgAction::Count)]
    rotate_right: u8,

    /// Mirror left-right
    #[arg(long)]
    flip_horizontal: bool,

    /// Mirror top-bottom
    #[arg(long)]
    flip_vertical: bool,

    /// Crop region as LEFT,TOP,RIGHT,BOTTOM in image pixels
    #[arg(long, value_name = "L,T,R,B")]
    crop: Option<String>,

    /// Resize to an exact size, e.g. 1920x1080
    #[arg(long, value_name = "WxH")]
    resize: Option<String>,

    /// Filter to apply: blur, sharpen, contour, detail, emboss,
    /// edge-enhance, smooth, grayscale, sepia
    #[arg(long)]
    filter: Option<FilterKind>,

    /// Brightness factor, 0.0-2.0 (1.0 = unchanged)
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast factor, 0.0-2.0
    #[arg(long)]
    contrast: Option<f32>,

    /// Sharpness factor, 0.0-2.0
    #[arg(long)]
    sharpness: Option<f32>,
}

#[derive(Args)]
struct BatchArgs {
    /// Input images
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Output format: jpg, png, webp, bmp, tiff, gif
    #[arg(short, long, default_value = "jpg")]
    format: String,

    /// JPEG quality, 1-100 (defaults to the saved setting)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Resize every image, e.g. 1920x1080
    #[arg(long, value_name = "WxH")]
    resize: Option<String>,

    /// With --resize: stretch to the exact size instead of fitting
    /// inside it
    #[arg(long)]
    no_preserve_aspect: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings_path = Settings::default_path();
    let mut settings = Settings::load(&settings_path);

    match cli.command {
        Some(Command::Convert(args)) => convert(args, &mut settings)?,
        Some(Command::Batch(args)) => run_batch(args, &settings).await?,
        Some(Command::Recent) => show_recent(&settings),
        None => match cli.image {
            Some(path) => show_info(&path, &mut settings)?,
            None => bail!("no image given; see --help"),
        },
    }

    if let Err(e) = settings.save(&settings_path) {
        eprintln!("⚠️  Could not save settings: {e}");
    }
    Ok(())
}

/// Default action: open the file and print what the status bar would show.
fn show_info(path: &Path, settings: &mut Settings) -> Result<()> {
    let mut session = EditSession::new();
    session
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    settings.add_recent_file(path);

    let img = session.image().context("image did not load")?;
    let (w, h) = img.adjusted.dimensions();
    println!("🖼  {}", path.display());
    println!("   Format: {}", img.adjusted.format().unwrap_or("unknown"));
    println!(
        "   Size: {w}x{h} ({} bit {})",
        img.adjusted.mode().bit_depth(),
        img.adjusted.mode()
    );
    println!("   File: {}", format_file_size(img.file_size));

    let browser = DirectoryBrowser::scan(path);
    let (pos, total) = browser.position();
    if total > 1 {
        println!("   Folder: image {pos} of {total}");
    }

    let metadata = img.adjusted.metadata();
    if metadata.is_empty() {
        println!("   No EXIF metadata");
    } else {
        println!("   EXIF:");
        for (tag, value) in metadata {
            println!("     {tag}: {value}");
        }
    }
    Ok(())
}

fn show_recent(settings: &Settings) {
    if settings.recent_files.is_empty() {
        println!("📂 No recent files");
        return;
    }
    println!("📂 Recent files:");
    for (i, path) in settings.recent_files.iter().enumerate() {
        println!("   {}. {}", i + 1, path.display());
    }
}

fn convert(args: ConvertArgs, settings: &mut Settings) -> Result<()> {
    let format = OutputFormat::from_path(&args.output)
        .with_context(|| format!("unsupported output extension: {}", args.output.display()))?;
    let quality = args.quality.unwrap_or(settings.quality_value);

    let mut session = EditSession::new();
    session
        .open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    settings.add_recent_file(&args.input);

    let mut commands = Vec::new();
    for _ in 0..args.rotate_left {
        commands.push(EditCommand::RotateLeft);
    }
    for _ in 0..args.rotate_right {
        commands.push(EditCommand::RotateRight);
    }
    if args.flip_horizontal {
        commands.push(EditCommand::FlipHorizontal);
    }
    if args.flip_vertical {
        commands.push(EditCommand::FlipVertical);
    }
    if let Some(spec) = &args.crop {
        let (left, top, right, bottom) = parse_crop(spec)?;
        commands.push(EditCommand::Crop {
            left,
            top,
            right,
            bottom,
        });
    }
    if let Some(spec) = &args.resize {
        let (width, height) = parse_size(spec)?;
        commands.push(EditCommand::Resize { width, height });
    }
    if let Some(filter) = args.filter {
        commands.push(EditCommand::Filter(filter));
    }
    if let Some(v) = args.brightness {
        commands.push(EditCommand::SetBrightness(v));
    }
    if let Some(v) = args.contrast {
        commands.push(EditCommand::SetContrast(v));
    }
    if let Some(v) = args.sharpness {
        commands.push(EditCommand::SetSharpness(v));
    }

    for cmd in commands {
        match session.dispatch(cmd)? {
            Outcome::Applied { status } => println!("✏️  {status}"),
            Outcome::Ignored => {}
        }
    }

    let buffer = session.current().context("no image in session")?;
    codec::encode_to_file(buffer, &args.output, format, quality)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("✅ Saved {} ({format})", args.output.display());
    Ok(())
}

async fn run_batch(args: BatchArgs, settings: &Settings) -> Result<()> {
    let format = OutputFormat::from_extension(&args.format)
        .with_context(|| format!("unsupported output format: {}", args.format))?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;
    let resize = args.resize.as_deref().map(parse_size).transpose()?;

    let job = batch::BatchJob {
        files: args.files,
        output_dir: args.out_dir,
        format,
        quality: args.quality.unwrap_or(settings.quality_value),
        resize,
        preserve_aspect: !args.no_preserve_aspect,
    };
    let total = job.files.len();
    println!("🔄 Converting {total} files to {format}...");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(batch::run(job, tx));

    while let Some(event) = rx.recv().await {
        match event {
            batch::BatchProgress::Converted {
                index,
                total,
                output,
            } => println!("   [{}/{total}] ✅ {}", index + 1, output.display()),
            batch::BatchProgress::Failed {
                index,
                total,
                input,
                reason,
            } => eprintln!(
                "   [{}/{total}] ⚠️  {}: {reason}",
                index + 1,
                input.display()
            ),
        }
    }

    let summary = worker.await.context("batch worker failed")?;
    println!(
        "✅ Batch complete: {} converted, {} failed",
        summary.converted, summary.failed
    );
    if summary.failed > 0 {
        bail!("{} files failed to convert", summary.failed);
    }
    Ok(())
}

/// "L,T,R,B" in image pixels.
fn parse_crop(spec: &str) -> Result<(u32, u32, u32, u32)> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        bail!("crop must be LEFT,TOP,RIGHT,BOTTOM, got '{spec}'");
    }
    let mut values = [0u32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("bad crop value '{part}'"))?;
    }
    Ok((values[0], values[1], values[2], values[3]))
}

/// "WxH", e.g. "1920x1080".
fn parse_size(spec: &str) -> Result<(u32, u32)> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("size must be WxH, got '{spec}'"))?;
    let width = w.trim().parse().with_context(|| format!("bad width '{w}'"))?;
    let height = h
        .trim()
        .parse()
        .with_context(|| format!("bad height '{h}'"))?;
    Ok((width, height))
}

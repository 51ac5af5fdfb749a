use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use drape::{
    AnchorMode, BatchDriver, BatchJob, BatchOptions, BatchReport, CompositionEngine,
    DirAssetStore, DirSink, EngineConfig, JobList, LightBlendMode, LogoSize, OutputFormat,
    Placement, Point, ReferencePoint, WrapStrategy, catalog_jobs, decode_image, encode_jpeg,
    encode_png,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drape", version, about = "Put logos on garment photos")]
struct Cli {
    /// Engine constants as JSON (margins, blur radius, units, JPEG quality).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one logo onto one base image.
    Compose(ComposeArgs),
    /// Run a job sheet (or a whole-catalog pass) over directories of assets.
    Batch(BatchArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    None,
    Displacement,
    LightBlend,
    Perspective,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

#[derive(Args, Debug)]
struct WrapArgs {
    /// Fabric simulation applied to the logo.
    #[arg(long, value_enum, default_value_t = StrategyArg::None)]
    strategy: StrategyArg,

    /// Displacement shift in pixels, or light-blend weight in [0, 1].
    #[arg(long)]
    intensity: Option<f32>,

    /// Light blend only where the fabric is brighter than the configured threshold.
    #[arg(long, default_value_t = false)]
    thresholded: bool,

    /// Perspective corners TL TR BR BL in scaled-logo pixels: "x,y x,y x,y x,y".
    #[arg(long)]
    corners: Option<String>,

    /// Base-image top-left for the warped logo: "x,y".
    #[arg(long)]
    offset: Option<String>,
}

#[derive(Args, Debug)]
struct PlacementArgs {
    /// Named placement: center, upper-left, upper-right, lower-left, lower-right.
    #[arg(long, default_value = "center")]
    placement: String,

    /// Explicit x (overrides --placement together with --y).
    #[arg(long, requires = "y")]
    x: Option<i64>,

    /// Explicit y.
    #[arg(long, requires = "x")]
    y: Option<i64>,

    /// Whether --x/--y denote the logo center or its top-left corner.
    #[arg(long, default_value_t = false)]
    top_left: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Garment photo.
    #[arg(long)]
    base: PathBuf,

    /// Logo artwork.
    #[arg(long)]
    logo: PathBuf,

    /// Output path; `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(long)]
    out: PathBuf,

    /// Logo height as a fraction of the base height.
    #[arg(long, default_value_t = 0.3, conflicts_with = "width")]
    scale: f64,

    /// Logo width in pixels (height follows the aspect ratio).
    #[arg(long)]
    width: Option<u32>,

    #[command(flatten)]
    place: PlacementArgs,

    #[command(flatten)]
    wrap: WrapArgs,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Job sheet (JSON array of records).
    #[arg(long, required_unless_present = "catalog", conflicts_with = "catalog")]
    jobs: Option<PathBuf>,

    /// Put this graphic on every image in --bases instead of reading a sheet.
    #[arg(long)]
    catalog: Option<String>,

    /// Logo height fraction in catalog mode.
    #[arg(long, default_value_t = 0.35)]
    scale: f64,

    /// Named placement in catalog mode.
    #[arg(long, default_value = "center")]
    placement: String,

    /// Directory of graphics.
    #[arg(long)]
    graphics: PathBuf,

    /// Directory of base images.
    #[arg(long)]
    bases: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatArg::Jpeg)]
    format: FormatArg,

    /// Write a JSON report of successes and failures here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Compose jobs in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Jobs per parallel round.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    #[command(flatten)]
    wrap: WrapArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    tracing::debug!(?config, "engine config");
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args, config),
        Command::Batch(args) => cmd_batch(args, config),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_compose(args: ComposeArgs, config: EngineConfig) -> anyhow::Result<()> {
    let base = read_image(&args.base)?;
    let logo = read_image(&args.logo)?;

    let placement = match (args.place.x, args.place.y) {
        (Some(x), Some(y)) => {
            let anchor = if args.place.top_left {
                AnchorMode::TopLeft
            } else {
                AnchorMode::Center
            };
            Placement::explicit(x, y, anchor)
        }
        _ => Placement::at(args.place.placement.parse::<ReferencePoint>()?),
    };
    let size = match args.width {
        Some(w) => LogoSize::Width(w),
        None => LogoSize::HeightFraction(args.scale),
    };
    let strategy = wrap_strategy(&args.wrap)?;
    let quality = config.jpeg_quality;

    let engine = CompositionEngine::new(config);
    let out = engine.compose(&base, &logo, &placement, size, &strategy)?;

    let is_jpeg = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    let bytes = if is_jpeg {
        encode_jpeg(&out, quality)?
    } else {
        encode_png(&out)?
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write output '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs, config: EngineConfig) -> anyhow::Result<()> {
    let jobs: Vec<BatchJob> = match (&args.jobs, &args.catalog) {
        (Some(path), _) => JobList::from_path(path)?.into_jobs()?,
        (None, Some(graphic)) => {
            let placement = Placement::at(args.placement.parse::<ReferencePoint>()?);
            catalog_jobs(graphic, list_images(&args.bases)?, placement, args.scale)
        }
        (None, None) => anyhow::bail!("either --jobs or --catalog is required"),
    };

    let format = match args.format {
        FormatArg::Png => OutputFormat::Png,
        FormatArg::Jpeg => OutputFormat::Jpeg {
            quality: config.jpeg_quality,
        },
    };
    let options = BatchOptions {
        strategy: wrap_strategy(&args.wrap)?,
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    let store = DirAssetStore::new(&args.graphics, &args.bases);
    let mut sink = DirSink::new(&args.out, format);
    let driver = BatchDriver::new(CompositionEngine::new(config), options);
    let report = driver.run(&jobs, &store, &mut sink)?;

    for failure in &report.failures {
        eprintln!(
            "failed #{} ({}): {}",
            failure.index,
            failure.job.output_id(),
            failure.error
        );
    }
    eprintln!(
        "{} of {} jobs succeeded, outputs in {}",
        report.successes.len(),
        report.total(),
        args.out.display()
    );
    if let Some(error) = &report.finish_error {
        eprintln!("output sink failed to finish: {error}");
    }

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    if let Some(error) = report.finish_error {
        return Err(anyhow::Error::new(error).context("finish batch outputs"));
    }
    Ok(())
}

fn wrap_strategy(args: &WrapArgs) -> anyhow::Result<WrapStrategy> {
    let strategy = match args.strategy {
        StrategyArg::None => WrapStrategy::None,
        StrategyArg::Displacement => WrapStrategy::Displacement {
            intensity: args.intensity.unwrap_or(15.0),
        },
        StrategyArg::LightBlend => WrapStrategy::LightBlend {
            intensity: args.intensity.unwrap_or(0.4),
            mode: if args.thresholded {
                LightBlendMode::Thresholded
            } else {
                LightBlendMode::Unconditional
            },
        },
        StrategyArg::Perspective => {
            let raw = args
                .corners
                .as_deref()
                .context("--strategy perspective requires --corners")?;
            let offset = args
                .offset
                .as_deref()
                .map(parse_pair)
                .transpose()?
                .map(|(x, y)| (x as i64, y as i64));
            WrapStrategy::PerspectiveWarp {
                corners: parse_corners(raw)?,
                offset,
            }
        }
    };
    strategy.validate()?;
    Ok(strategy)
}

fn parse_pair(s: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected 'x,y', got '{s}'"))?;
    let x = x.trim().parse().with_context(|| format!("bad x in '{s}'"))?;
    let y = y.trim().parse().with_context(|| format!("bad y in '{s}'"))?;
    Ok((x, y))
}

fn parse_corners(s: &str) -> anyhow::Result<[Point; 4]> {
    let pts = s
        .split_whitespace()
        .map(|p| parse_pair(p).map(|(x, y)| Point::new(x, y)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    <[Point; 4]>::try_from(pts)
        .map_err(|v| anyhow::anyhow!("expected 4 corners, got {}", v.len()))
}

fn list_images(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("list bases in '{}'", dir.display()))?
    {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"));
        if is_image && let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn read_image(path: &Path) -> anyhow::Result<drape::RasterBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).with_context(|| format!("decode image '{}'", path.display()))
}

fn write_report(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let failed: Vec<_> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "index": f.index,
                "output_id": f.job.output_id(),
                "graphic": f.job.graphic_id,
                "base": f.job.base_id,
                "error": f.error.to_string(),
            })
        })
        .collect();
    let json = serde_json::json!({
        "total": report.total(),
        "succeeded": report.successes,
        "failed": failed,
        "masks_derived": report.masks_derived,
        "finish_error": report.finish_error.as_ref().map(|e| e.to_string()),
    });
    let text = serde_json::to_string_pretty(&json).context("serialize batch report")?;
    std::fs::write(path, text).with_context(|| format!("write report '{}'", path.display()))?;
    Ok(())
}

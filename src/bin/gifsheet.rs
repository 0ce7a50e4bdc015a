use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gifsheet::{Background, FrameSource as _, GifFrameSource, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "gifsheet", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a GIF into a PNG sprite sheet.
    Sheet(SheetArgs),
    /// Print frame count, canvas size and per-frame disposal of a GIF.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct SheetArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = "sprite-sheet.png")]
    out: PathBuf,

    /// JSON render config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width and height of the square sheet in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Fixed number of columns.
    #[arg(long)]
    columns: Option<u32>,

    /// Frames to drop between kept frames.
    #[arg(long)]
    skip: Option<u32>,

    /// Keep frame aspect ratio (fill and crop each cell).
    #[arg(long)]
    keep_aspect: bool,

    /// Nearest-neighbour scaling.
    #[arg(long)]
    pixel_perfect: bool,

    /// `transparent` or a hex color such as `#ffffff`.
    #[arg(long)]
    background: Option<Background>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Sheet(args) => cmd_sheet(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn open_gif(path: &Path) -> anyhow::Result<GifFrameSource> {
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if !is_gif {
        anyhow::bail!("'{}' is not a .gif file", path.display());
    }
    GifFrameSource::open(path).with_context(|| format!("load gif '{}'", path.display()))
}

fn read_config_json(path: &Path) -> anyhow::Result<RenderConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cfg: RenderConfig =
        serde_json::from_reader(r).with_context(|| "parse render config JSON")?;
    Ok(cfg)
}

fn resolve_config(args: &SheetArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = match &args.config {
        Some(path) => read_config_json(path)?,
        None => RenderConfig::default(),
    };
    if let Some(size) = args.size {
        cfg.output_size = size;
    }
    if args.columns.is_some() {
        cfg.columns = args.columns;
    }
    if let Some(skip) = args.skip {
        cfg.frame_skip = skip;
    }
    if args.keep_aspect {
        cfg.preserve_aspect = true;
    }
    if args.pixel_perfect {
        cfg.pixel_perfect = true;
    }
    if let Some(bg) = args.background {
        cfg.background = bg;
    }
    Ok(cfg)
}

fn cmd_sheet(args: SheetArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;
    let source = open_gif(&args.in_path)?;
    eprintln!(
        "loaded {} ({} frames)",
        args.in_path.display(),
        source.frame_count()
    );

    let sheet = gifsheet::render_sprite_sheet(&source, &cfg)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &sheet.bitmap.data,
        sheet.bitmap.width,
        sheet.bitmap.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("{}", sheet.summary());
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let source = open_gif(&args.in_path)?;
    println!("file:       {}", args.in_path.display());
    println!(
        "canvas:     {}x{}",
        source.canvas_width(),
        source.canvas_height()
    );
    println!("frames:     {}", source.frame_count());
    match source.background_color() {
        Some([r, g, b]) => println!("background: #{r:02x}{g:02x}{b:02x}"),
        None => println!("background: none"),
    }
    for i in 0..source.frame_count() {
        let meta = source.frame_meta(i);
        let delay = source
            .frame_delay_ms(i)
            .map_or_else(|| "?".to_string(), |ms| format!("{ms}ms"));
        println!("  #{i:<4} {:<18} {delay}", meta.disposal.as_str());
    }
    Ok(())
}

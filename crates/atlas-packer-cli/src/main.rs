use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use atlas_packer_core::config::{
    Algorithm, GuillotineChoice, GuillotineSplit, SkylinePicker, SortOrder,
};
use atlas_packer_core::{CancelToken, Frame, PackerConfig, PackingResult, ProgressCallback};
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "atlas-packer",
    about = "Lay out rectangles for a texture atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Place rectangles into a fixed box
    Pack(PackArgs),
    /// Search for the smallest box holding the rectangles
    Find(FindArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Rectangle list: JSON or YAML sequence of `{key, w, h}`
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Write the layout here instead of stdout
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// YAML file overriding the algorithm options below
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Print the effective config (json|yaml) and exit
    #[arg(long, value_parser = ["json", "yaml"], help_heading = "Input/Output")]
    print_config: Option<String>,

    #[arg(long, value_parser = ["bottom_left", "guillotine", "maxrects", "skyline"], default_value = "skyline", help_heading = "Algorithms")]
    algorithm: String,
    /// Input order: height_width_desc | height_width_asc | preserve
    #[arg(long, default_value = "height_width_desc", help_heading = "Algorithms")]
    sort_order: String,
    /// Guillotine choice (baf|bssf|blsf|waf|wssf|wlsf)
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    g_choice: String,
    /// Guillotine split (slas|llas|minas|maxas|sas|las)
    #[arg(long, default_value = "las", help_heading = "Heuristics")]
    g_split: String,
    /// Skyline picker (mw|ff|bl)
    #[arg(long, default_value = "mw", help_heading = "Heuristics")]
    skyline: String,
}

#[derive(Args, Debug, Clone)]
struct PackArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: i32,
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: i32,
}

#[derive(Args, Debug, Clone)]
struct FindArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 100, help_heading = "Search")]
    generations: i32,
    #[arg(long, default_value_t = 20, help_heading = "Search")]
    population: usize,
    #[arg(long, default_value_t = 0.2, help_heading = "Search")]
    mutation_rate: f64,
    #[arg(long, default_value_t = 0.85, help_heading = "Search")]
    crossover_rate: f64,
    /// Fixed seed for a reproducible search
    #[arg(long, help_heading = "Search")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Pack(args) => run_pack(args, show_progress),
        Commands::Find(args) => run_find(args, show_progress),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(&args.common, PackerConfig::default())?;
    if print_config(&args.common, &cfg)? {
        return Ok(());
    }
    let frames = load_frames(&args.common.input)?;

    let mut packer = cfg.build_algorithm::<String>();
    let bar = progress_bar(show_progress, packer.name())?;
    if let Some(b) = &bar {
        packer.on_progress(bar_callback(b));
    }

    let start = Instant::now();
    let layout = packer
        .place(args.width, args.height, &frames, &CancelToken::new())
        .with_context(|| format!("place {} rectangles", frames.len()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let Some(layout) = layout else {
        anyhow::bail!(
            "{} could not fit {} rectangles into {}x{}",
            packer.name(),
            frames.len(),
            args.width,
            args.height
        );
    };
    info!(
        algorithm = packer.name(),
        elapsed = ?start.elapsed(),
        "{}",
        layout.summary()
    );
    write_layout(&args.common, &layout)
}

fn run_find(args: &FindArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = PackerConfig::builder()
        .generations(args.generations)
        .population(args.population)
        .mutation_rate(args.mutation_rate)
        .crossover_rate(args.crossover_rate)
        .seed(args.seed)
        .build();
    let cfg = build_config(&args.common, base)?;
    if print_config(&args.common, &cfg)? {
        return Ok(());
    }
    let frames = load_frames(&args.common.input)?;

    let mut finder = cfg.build_finder();
    let bar = progress_bar(show_progress, "search")?;
    if let Some(b) = &bar {
        finder.on_progress(bar_callback(b));
    }

    let start = Instant::now();
    let layout = finder
        .find_minimum_bounding_box(&frames, &CancelToken::new())
        .with_context(|| format!("search box for {} rectangles", frames.len()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(
        inner = finder.algorithm_name(),
        generations = cfg.generations,
        elapsed = ?start.elapsed(),
        "{}",
        layout.summary()
    );
    write_layout(&args.common, &layout)
}

/// Applies the command-line options, then the YAML overrides, and validates.
fn build_config(args: &CommonArgs, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
    cfg.algorithm = parse_flag::<Algorithm>("algorithm", &args.algorithm)?;
    cfg.sort_order = parse_flag::<SortOrder>("sort order", &args.sort_order)?;
    cfg.g_choice = parse_flag::<GuillotineChoice>("guillotine choice", &args.g_choice)?;
    cfg.g_split = parse_flag::<GuillotineSplit>("guillotine split", &args.g_split)?;
    cfg.skyline_picker = parse_flag::<SkylinePicker>("skyline picker", &args.skyline)?;

    if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_packer_config(cfg);
    }
    cfg.validate()?;
    debug!(?cfg, "effective config");
    Ok(cfg)
}

fn parse_flag<T: std::str::FromStr>(what: &str, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown {}: {}", what, value))
}

fn print_config(args: &CommonArgs, cfg: &PackerConfig) -> anyhow::Result<bool> {
    let Some(fmt) = &args.print_config else {
        return Ok(false);
    };
    let text = match fmt.as_str() {
        "yaml" => serde_yaml::to_string(cfg)?,
        _ => serde_json::to_string_pretty(cfg)?,
    };
    println!("{}", text);
    Ok(true)
}

#[derive(Debug, Deserialize)]
struct Sprite {
    key: String,
    w: i32,
    h: i32,
}

fn load_frames(path: &Path) -> anyhow::Result<Vec<Frame<String>>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    let sprites: Vec<Sprite> = if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    };
    if sprites.is_empty() {
        warn!(path = %path.display(), "input holds no rectangles");
    }
    Ok(sprites
        .into_iter()
        .map(|s| Frame::sized(s.key, s.w, s.h))
        .collect())
}

fn write_layout(args: &CommonArgs, layout: &PackingResult) -> anyhow::Result<()> {
    if !layout.is_disjoint() || !layout.fits_within() {
        warn!("layout failed the overlap/containment check");
    }
    let json = serde_json::to_string_pretty(layout)?;
    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "layout written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn progress_bar(show: bool, label: &str) -> anyhow::Result<Option<ProgressBar>> {
    if !show {
        return Ok(None);
    }
    let b = ProgressBar::new(100);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} {msg} [{bar:30}] {pos}% [{elapsed_precise}]",
    )?);
    b.set_message(label.to_string());
    Ok(Some(b))
}

fn bar_callback(bar: &ProgressBar) -> ProgressCallback {
    let bar = bar.clone();
    Box::new(move |_, p| bar.set_position(p as u64))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    algorithm: Option<String>,
    sort_order: Option<String>,
    g_choice: Option<String>,
    g_split: Option<String>,
    skyline: Option<String>,
    allow_rotation: Option<bool>,
    generations: Option<i32>,
    population: Option<usize>,
    mutation_rate: Option<f64>,
    crossover_rate: Option<f64>,
    seed: Option<u64>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.algorithm {
            cfg.algorithm = v.parse().unwrap_or(cfg.algorithm);
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = v.parse().unwrap_or(cfg.sort_order);
        }
        if let Some(v) = self.g_choice {
            cfg.g_choice = v.parse().unwrap_or(cfg.g_choice);
        }
        if let Some(v) = self.g_split {
            cfg.g_split = v.parse().unwrap_or(cfg.g_split);
        }
        if let Some(v) = self.skyline {
            cfg.skyline_picker = v.parse().unwrap_or(cfg.skyline_picker);
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.generations {
            cfg.generations = v;
        }
        if let Some(v) = self.population {
            cfg.population = v;
        }
        if let Some(v) = self.mutation_rate {
            cfg.mutation_rate = v;
        }
        if let Some(v) = self.crossover_rate {
            cfg.crossover_rate = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = Some(v);
        }
        cfg
    }
}

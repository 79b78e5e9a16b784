use crate::{
    config::{Config, OutputFormat},
    dice_set::{DiceSet, MAX_SIDES, MIN_SIDES},
    report::{self, DieReport, SetReport},
    rolls::parse_rolls,
    util::{ensure_dir, read_input},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dice-bias")]
#[command(about = "Log dice rolls and test them for bias against a fair die")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./dice-bias.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a list of rolls for a single die.
    Analyze {
        #[arg(long, value_parser = sides_parser())]
        sides: u32,
        /// Roll file; stdin when omitted or `-`.
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Write a new standard dice set (d4, d6, d8, 2x d10, d12, d20).
    NewSet {
        #[arg(long)]
        name: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Add a custom die to a set file.
    AddDie {
        #[arg(long)]
        set: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = sides_parser())]
        sides: u32,
    },
    /// Append rolls to one die of a set file.
    AddRolls {
        #[arg(long)]
        set: PathBuf,
        #[arg(long)]
        die: String,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Show distribution and bias statistics for a set.
    ViewSet {
        #[arg(long)]
        set: PathBuf,
        #[arg(long)]
        die: Option<String>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn sides_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(i64::from(MIN_SIDES)..=i64::from(MAX_SIDES))
}

pub fn dispatch(args: Args) -> Result<()> {
    let loaded = match resolve_config_path(args.config.as_deref()) {
        Some(p) => Config::load(&p).map(Some),
        None => Ok(None),
    };
    // Logging comes up even on a bad config so the load error is reported.
    let cfg = match &loaded {
        Ok(Some(c)) => c.clone(),
        _ => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;
    loaded?;

    match &args.cmd {
        Command::Analyze {
            sides,
            input,
            format,
        } => analyze(&cfg, *sides, input.as_deref(), *format),
        Command::NewSet { name, out, force } => new_set(name, out, *force),
        Command::AddDie { set, name, sides } => add_die(set, name, *sides),
        Command::AddRolls { set, die, input } => add_rolls(set, die, input.as_deref()),
        Command::ViewSet { set, die, format } => view_set(&cfg, set, die.as_deref(), *format),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("dice-bias.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            ensure_dir(parent)?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("dice-bias.log"))
}

fn analyze(
    cfg: &Config,
    sides: u32,
    input: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let raw = read_input(input)?;
    let parsed = parse_rolls(&raw);
    if parsed.skipped > 0 {
        warn!("skipped {} non-integer tokens", parsed.skipped);
    }

    let report = DieReport::build(&format!("d{sides}"), sides, &parsed.values, cfg)?;
    info!(
        rolls = report.total_rolls,
        out_of_range = report.skipped_out_of_range,
        "analyzed d{sides}"
    );

    match format.unwrap_or(cfg.output.format) {
        OutputFormat::Json => println!("{}", report::to_json(&report, cfg)?),
        OutputFormat::Text => print!("{}", report::render_text(&report, cfg.output.bar_width)),
    }
    Ok(())
}

fn new_set(name: &str, out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        return Err(anyhow!(
            "set file already exists and --force not given: {}",
            out.display()
        ));
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let set = DiceSet::standard(name);
    set.save(out)?;
    info!("created set {:?} with {} dice at {}", set.name, set.dice.len(), out.display());
    Ok(())
}

fn add_die(set_path: &Path, name: &str, sides: u32) -> Result<()> {
    let mut set = DiceSet::load(set_path)?;
    set.add_die(name, sides)?;
    set.save(set_path)?;
    info!("added {name} (d{sides}) to {}", set_path.display());
    Ok(())
}

fn add_rolls(set_path: &Path, die: &str, input: Option<&Path>) -> Result<()> {
    let mut set = DiceSet::load(set_path)?;
    let raw = read_input(input)?;
    let parsed = parse_rolls(&raw);
    if parsed.skipped > 0 {
        warn!("skipped {} non-integer tokens", parsed.skipped);
    }

    let target = set.die_mut(die)?;
    target.record(&parsed.values);
    debug!(die, total = target.rolls.len(), "recorded rolls");
    set.save(set_path)?;

    info!("added {} rolls to {die} in {}", parsed.values.len(), set_path.display());
    Ok(())
}

fn view_set(
    cfg: &Config,
    set_path: &Path,
    die: Option<&str>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let set = DiceSet::load(set_path)?;
    let report = SetReport::build(&set, die, cfg)?;

    for d in &report.dice {
        if let Some(b) = &d.bias {
            if b.is_biased {
                warn!(die = %d.die, p_value = b.p_value, "die looks biased");
            }
        }
    }

    match format.unwrap_or(cfg.output.format) {
        OutputFormat::Json => println!("{}", report::to_json(&report, cfg)?),
        OutputFormat::Text => print!("{}", report::render_set_text(&report, cfg.output.bar_width)),
    }
    Ok(())
}

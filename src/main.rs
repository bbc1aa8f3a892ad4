use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use platformer::{ConfigLoader, GameConfig, GameContext, GameEngine, Timeline};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless tile platformer runner")]
struct Cli {
    /// Path to the game configuration YAML file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start directly in this level instead of the menu
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// YAML timeline of scripted actions ({frame, name, phase})
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Print the final frame view as JSON
    #[arg(long)]
    dump_frame: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, base_dir) = match &cli.config {
        Some(path) => {
            let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            let file = path.file_name().context("config path has no file name")?;
            (ConfigLoader::new(&base_dir).load(file)?, base_dir)
        }
        None => (GameConfig::default(), PathBuf::from(".")),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("invalid logging level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let timeline = match &cli.actions {
        Some(path) => Timeline::load(path)?,
        None => Timeline::default(),
    };

    let name = config.name.clone();
    let context = GameContext::new(config, base_dir);
    let mut engine = match &cli.level {
        Some(level) => GameEngine::with_level(context, level)?,
        None => GameEngine::new(context),
    };

    info!(game = %name, frames = cli.frames, actions = timeline.len(), "starting run");
    let summary = engine.run(cli.frames, &timeline)?;
    info!(
        frames = summary.frames,
        scene = summary.scene,
        entities = summary.entities,
        running = summary.running,
        "run complete"
    );

    if cli.dump_frame {
        let view = serde_json::to_string_pretty(&engine.render())
            .context("Failed to serialize frame view")?;
        println!("{view}");
    }
    Ok(())
}

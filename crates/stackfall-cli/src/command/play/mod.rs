use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use stackfall_engine::{Board, PieceSeed, config::BoardConfig};
use stackfall_runtime::{Runtime, ScreenStack};

use self::screens::GameScreen;

mod screens;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Board configuration file (JSON; missing fields take their defaults)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Piece seed as 32 hex characters (random when omitted)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Start with the autonomous player enabled
    #[clap(long)]
    bot: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let config = match &arg.config {
        Some(path) => load_config(path)?,
        None => BoardConfig::default(),
    };
    let seed = arg.seed.unwrap_or_else(rand::random);
    tracing::info!(%seed, bot = arg.bot, "starting game");

    let board = Board::new(config, seed).context("Invalid board configuration")?;
    let mut stack = ScreenStack::new(Box::new(GameScreen::new(board, arg.bot)));
    Runtime::new()
        .run(&mut stack)
        .context("Terminal session failed")?;
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<BoardConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

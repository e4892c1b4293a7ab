use std::io::{self, Write as _};

use anyhow::Context as _;
use stackfall_engine::config::BoardConfig;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DefaultConfigArg {
    /// Print on a single line
    #[clap(long)]
    compact: bool,
}

pub(crate) fn run(arg: &DefaultConfigArg) -> anyhow::Result<()> {
    let config = BoardConfig::default();
    let json = if arg.compact {
        serde_json::to_string(&config)
    } else {
        serde_json::to_string_pretty(&config)
    }
    .context("Failed to serialize default config")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write to stdout")?;
    Ok(())
}

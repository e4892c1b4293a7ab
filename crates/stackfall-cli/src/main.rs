mod command;
mod ui;

fn main() -> anyhow::Result<()> {
    command::run()
}

//! Madang CLI - reporting dashboard over the Madang bookstore CSV data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "madang",
    version,
    about = "Madang bookstore reporting dashboard"
)]
struct Cli {
    #[command(flatten)]
    options: madang_cmd::Options,

    #[command(subcommand)]
    command: madang_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Loading dataset from {}", cli.options.data_dir.display());
    madang_cmd::run(&cli.options, cli.command)
}

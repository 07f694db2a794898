//! Command-line tool for viewing and changing mdview editor preferences.

mod cli;

fn main() -> eyre::Result<()> {
    use clap::Parser;

    color_eyre::install()?;

    // Initialize logging.
    env_logger::builder().init();

    let args = cli::Args::parse();
    cli::exec(args, &mut std::io::stdout().lock())
}

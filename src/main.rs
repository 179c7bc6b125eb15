use cartonkit::cli::{run, Cli};
use cartonkit::{init_logging_with, verbosity_level};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging_with(verbosity_level(cli.verbose), cli.log_json)?;

    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

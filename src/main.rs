mod app;
mod cli;
mod config;
mod headless;
mod input;
mod logging;
mod run;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_json);

    let summary = run::execute(&cli)?;
    eprintln!(
        "Session complete: {} trials, {} responses, {} correct.",
        summary.trials, summary.responses, summary.correct
    );
    Ok(())
}

mod cli;
mod params;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Params(args)) => params::print_params(&cli.run, args.json),
        None => run::run(cli.run),
    }
}

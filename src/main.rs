use clap::Parser;
use fundfields::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

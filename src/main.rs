use clap::Parser;
use weekrot::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

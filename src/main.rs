use clap::Parser;
use smacross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

use clap::Parser;
use swingtrader::cli::{init_logging, run, Cli};

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}

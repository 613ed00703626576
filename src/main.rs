use std::{
    io::{stderr, stdout},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::LevelFilter;

use tree_lox_command::interpreter::run_interpreter;

const EXIT_USAGE: u8 = 64;

/// Tree-walking interpreter for the Lox scripting language.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Script to run. Without one, an interactive prompt is started.
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(EXIT_USAGE);
        }
        Err(e) => {
            // --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };
    run_interpreter(cli.script.as_ref(), &mut stdout(), &mut stderr())
}

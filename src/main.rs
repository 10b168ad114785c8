use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = tacktrack::cli::Cli::parse();

    match tacktrack::run_blocking(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", tacktrack::commands::describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

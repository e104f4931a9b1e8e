//! # Kira
//!
//! This binary drives the Kira interpreter: given a file argument it runs
//! that file and exits with the result's status code; given none it starts
//! the interactive shell.

mod cli;

use std::fs;

use cli::Cli;
use log::{error, info};

use kira::environment::Environment;
use kira::error::{self, exit_code};
use kira::repl;

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let Some(path) = args.file else {
        repl::run();
        return;
    };

    info!("running {}", path.display());

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            error!("could not read {}: {err}", path.display());
            std::process::exit(1);
        }
    };

    let env = Environment::new();
    let result = error::run(&source, &env);

    if let Err(err) = &result {
        eprintln!("{err}");
    }

    std::process::exit(exit_code(&result));
}

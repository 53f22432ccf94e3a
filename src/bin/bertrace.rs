//! Prints the structure of BER encoded data.
//!
//! Takes a single file containing the data as hexadecimal text, decodes
//! the bytes it describes, and prints every encoded value found in them
//! as an indented trace.

use std::io;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use bertrace::{hex, walk, TextRenderer};
use clap::Parser;
use log::debug;

#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    /// File containing the data as hexadecimal text.
    file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    ).init();

    // Any argument trouble, wrong argument counts included, prints the
    // usage and exits successfully, same as an explicit -h.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::SUCCESS
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}.", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let data = hex::read_file(&args.file)?;
    debug!("decoding {} octets", data.len());
    let stdout = io::stdout();
    let mut renderer = TextRenderer::new(stdout.lock());
    walk(&data, &mut renderer)?;
    Ok(())
}

mod cli;
mod command;
mod config;
mod error;
mod shadow {
    #![allow(clippy::needless_raw_string_hashes)]
    use shadow_rs::shadow;
    shadow!(build);

    pub use self::build::*;
}

use std::{io, process};

use clap::Parser;

use self::{cli::Cli, error::CommandError};

fn main() {
    let exit_code = match Cli::parse().run(&mut io::stdout()) {
        Ok(()) => exitcode::OK,
        Err(err) => {
            eprintln!("smtp-notifier: {err}");
            err.exit_code()
        }
    };

    process::exit(exit_code);
}

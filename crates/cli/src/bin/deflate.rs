use clap::Parser;
use cli::deflate::{self, DeflateCli};
use cli::{exit, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    let cli = DeflateCli::parse();
    exit::finish(deflate::execute(&cli))
}

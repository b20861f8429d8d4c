use clap::Parser;
use cli::mp3tag::{self, Mp3TagCli};
use cli::{exit, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    let cli = Mp3TagCli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    exit::finish(mp3tag::execute(&cli, &mut out))
}

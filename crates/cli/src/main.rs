use clap::Parser;
use cli::exit;
use cli::logging;
use cli::txtenc::{self, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    exit::finish(txtenc::execute(&cli, &mut out))
}

use crate::exit::Status;
use anyhow::{Context, Result};
use clap::Parser;
use recode_core::deflate;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "deflate")]
#[command(
    about = "Deflate a file from STDIN.\nAlternatively processes all files in a directory.\nDecompressed output is directed to STDOUT.",
    long_about = None
)]
pub struct DeflateCli {
    /// All files in the folder will be processed.
    /// WARNING: Each individual file will be loaded entirely in memory!
    #[arg(short = 'd', long = "input-dir")]
    pub input_dir: Option<PathBuf>,
}

pub fn execute(cli: &DeflateCli) -> Result<Status> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut status = stderr.lock();

    match &cli.input_dir {
        Some(dir) => {
            let summary = deflate::inflate_dir(dir, &mut out, &mut status)
                .with_context(|| format!("deflating {}", dir.display()))?;
            Ok(Status::from_clean(summary.failed == 0))
        }
        None => {
            writeln!(status, "[i] Input is STDIN...")?;
            let stdin = std::io::stdin();
            match deflate::inflate(stdin.lock(), Path::new("<stdin>")) {
                Ok(text) => {
                    writeln!(out, "{}", text)?;
                    Ok(Status::Success)
                }
                Err(e) => {
                    writeln!(status, "\n  [!] Failed to decompress; skipped.")?;
                    Err(e.into())
                }
            }
        }
    }
}

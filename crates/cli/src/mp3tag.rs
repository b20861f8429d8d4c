use crate::exit::Status;
use anyhow::{Context, Result};
use clap::Parser;
use recode_core::decision::Confidence;
use recode_core::detector::ChardetDetector;
use recode_core::mp3tag::{self, TagOutcome};
use recode_core::scanner::{self, ScanOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "mp3tagconvert")]
#[command(about = "Rewrite ID3 tags as ID3v2.4, re-decoding mislabelled legacy text.", long_about = None)]
pub struct Mp3TagCli {
    /// Directory to scan for .mp3 files, or a single .mp3
    pub path: PathBuf,
    /// Detection confidence needed before a text frame is re-decoded
    #[arg(long, default_value = "0.8", value_parser = parse_confidence)]
    pub confidence: Confidence,
    /// Copy each original here before rewriting its tag
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

fn parse_confidence(s: &str) -> Result<Confidence, String> {
    s.parse::<Confidence>().map_err(|e| e.to_string())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Mp3Summary {
    pub rewritten: usize,
    pub unchanged: usize,
    pub untagged: usize,
    pub failed: usize,
}

pub fn execute<W: Write>(cli: &Mp3TagCli, out: &mut W) -> Result<Status> {
    let summary = convert_all(cli, out)?;
    Ok(Status::from_clean(summary.failed == 0))
}

pub fn convert_all<W: Write>(cli: &Mp3TagCli, out: &mut W) -> Result<Mp3Summary> {
    let files = scanner::enumerate(&cli.path, &ScanOptions::with_extension("mp3"))
        .with_context(|| format!("listing {}", cli.path.display()))?;
    let mut summary = Mp3Summary::default();

    for task in &files {
        writeln!(
            out,
            "\n[{}/{}] Processing \"{}\"...",
            task.order,
            files.len(),
            task.path.display()
        )?;
        let outcome = mp3tag::convert_tag(
            &task.path,
            &ChardetDetector,
            cli.confidence,
            cli.backup_dir.as_deref(),
        );
        match outcome {
            Ok(TagOutcome::Rewritten {
                from_version,
                fixes,
            }) => {
                writeln!(
                    out,
                    "-- Rewritten as ID3v2.4 (was {:?}), {} frame(s) re-decoded",
                    from_version,
                    fixes.len()
                )?;
                for fix in fixes {
                    writeln!(
                        out,
                        "   {}: {:?} -> {:?} ({})",
                        fix.id, fix.before, fix.after, fix.encoding
                    )?;
                }
                summary.rewritten += 1;
            }
            Ok(TagOutcome::AlreadyCurrent) => {
                writeln!(out, "-- Already ID3v2.4; nothing to do.")?;
                summary.unchanged += 1;
            }
            Ok(TagOutcome::NoTag) => {
                writeln!(out, "-- No ID3v2 tag; skipped.")?;
                summary.untagged += 1;
            }
            Err(e) => {
                error!("{:?}: {}", task.path, e);
                writeln!(out, "-- Failed: {}", e)?;
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

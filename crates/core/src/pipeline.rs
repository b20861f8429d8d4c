//! Per-run orchestration: enumerate -> (decide -> skip | convert -> audit) -> summarize.

use crate::audit::{self, FileTypeProbe};
use crate::convert;
use crate::decision::{self, Decision, SourceMode};
use crate::detector::EncodingDetector;
use crate::encoding::TextEncoding;
use crate::error::{RecodeError, Result};
use crate::runlog::RunLog;
use crate::scanner::{self, FileTask, ScanOptions};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source: SourceMode,
    pub target: TextEncoding,
    pub backup_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Display,
    Convert(ConvertOptions),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: PathBuf,
    pub scan: ScanOptions,
    pub log_path: PathBuf,
    pub command: Command,
}

#[derive(Debug)]
pub enum FileOutcome {
    Displayed,
    Converted {
        from: TextEncoding,
        to: TextEncoding,
    },
    SkippedLowConfidence {
        confidence: f32,
        threshold: f32,
    },
    Failed(RecodeError),
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub displayed: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub log_path: PathBuf,
    pub log_records: usize,
}

impl RunSummary {
    /// True when every file went through without a skip or a failure.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }

    fn tally(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Displayed => self.displayed += 1,
            FileOutcome::Converted { .. } => self.converted += 1,
            FileOutcome::SkippedLowConfidence { .. } => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub fn run<D, W>(
    opts: &RunOptions,
    detector: &D,
    probe: &FileTypeProbe,
    out: &mut W,
) -> Result<RunSummary>
where
    D: EncodingDetector + ?Sized,
    W: Write,
{
    let tasks = scanner::enumerate(&opts.root, &opts.scan)?;
    writeln!(out, "Found {} files.", tasks.len()).map_err(RecodeError::Output)?;
    info!("enumerated {} files under {:?}", tasks.len(), opts.root);

    let mut log = RunLog::create(&opts.log_path)?;
    let mut summary = RunSummary {
        total: tasks.len(),
        log_path: opts.log_path.clone(),
        ..RunSummary::default()
    };

    for task in &tasks {
        let outcome = process_file(task, tasks.len(), opts, detector, probe, &mut log, out)?;
        summary.tally(&outcome);
    }

    summary.log_records = log.close()?;
    write_summary(&summary, out).map_err(RecodeError::Output)?;
    Ok(summary)
}

/// Handles one file. Per-file problems come back as `FileOutcome::Failed`; only
/// output and run-log write errors abort the run.
fn process_file<D, W>(
    task: &FileTask,
    total: usize,
    opts: &RunOptions,
    detector: &D,
    probe: &FileTypeProbe,
    log: &mut RunLog,
    out: &mut W,
) -> Result<FileOutcome>
where
    D: EncodingDetector + ?Sized,
    W: Write,
{
    let path = &task.path;
    match &opts.command {
        Command::Display => {
            writeln!(
                out,
                "\n[{}/{}] Encoding for \"{}\":",
                task.order,
                total,
                path.display()
            )
            .map_err(RecodeError::Output)?;
            Ok(print_audit(path, detector, probe, out)?.unwrap_or(FileOutcome::Displayed))
        }
        Command::Convert(conv) => {
            writeln!(
                out,
                "\n[{}/{}] Converting \"{}\" to {}...",
                task.order,
                total,
                path.display(),
                conv.target
            )
            .map_err(RecodeError::Output)?;

            let from = match decision::decide(path, &conv.source, detector) {
                Ok(Decision::Proceed { encoding, .. }) => encoding,
                Ok(Decision::Skip {
                    confidence,
                    threshold,
                }) => {
                    warn!(
                        "skipping {:?}: confidence {} below {}",
                        path, confidence, threshold
                    );
                    log.record_skip(path, confidence)?;
                    writeln!(out, "-- Skipped: confidence too low = {}", confidence)
                        .map_err(RecodeError::Output)?;
                    return Ok(FileOutcome::SkippedLowConfidence {
                        confidence,
                        threshold: threshold.value(),
                    });
                }
                Err(e) => return report_failure(path, e, out),
            };

            let converted =
                convert::convert_file(path, from, conv.target, conv.backup_dir.as_deref());
            if let Err(e) = converted {
                return report_failure(path, e, out);
            }
            info!("converted {:?} from {} to {}", path, from, conv.target);

            if let Some(failed) = print_audit(path, detector, probe, out)? {
                return Ok(failed);
            }
            Ok(FileOutcome::Converted {
                from,
                to: conv.target,
            })
        }
    }
}

/// Prints the audit lines. Returns `Some(Failed)` if the file could not be re-read.
fn print_audit<D, W>(
    path: &Path,
    detector: &D,
    probe: &FileTypeProbe,
    out: &mut W,
) -> Result<Option<FileOutcome>>
where
    D: EncodingDetector + ?Sized,
    W: Write,
{
    match audit::audit(path, detector, probe) {
        Ok(report) => {
            writeln!(out, "{}", report).map_err(RecodeError::Output)?;
            Ok(None)
        }
        Err(e) => report_failure(path, e, out).map(Some),
    }
}

fn report_failure<W: Write>(path: &Path, err: RecodeError, out: &mut W) -> Result<FileOutcome> {
    error!("{:?}: {}", path, err);
    writeln!(out, "-- Failed: {}", err).map_err(RecodeError::Output)?;
    Ok(FileOutcome::Failed(err))
}

fn write_summary<W: Write>(summary: &RunSummary, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "\nProcessed {} files: {} converted, {} skipped, {} failed.",
        summary.total, summary.converted, summary.skipped, summary.failed
    )?;
    if summary.log_records > 0 {
        writeln!(
            out,
            "\n[!] The conversion hasn't been entirely successful. See <{}> for details.",
            summary.log_path.display()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Confidence;
    use crate::detector::Detection;
    use std::cell::RefCell;
    use std::fs;

    /// Always answers with the same verdict and remembers what it was asked about.
    struct Scripted {
        verdict: Detection,
        seen: RefCell<Vec<PathBuf>>,
    }

    impl EncodingDetector for Scripted {
        fn detect_bytes(&self, _bytes: &[u8]) -> Detection {
            self.verdict.clone()
        }

        fn detect(&self, path: &Path) -> Result<Detection> {
            self.seen.borrow_mut().push(path.to_path_buf());
            Ok(self.verdict.clone())
        }
    }

    fn options(root: &Path, log: &Path, command: Command) -> RunOptions {
        RunOptions {
            root: root.to_path_buf(),
            scan: ScanOptions::with_extension("txt"),
            log_path: log.to_path_buf(),
            command,
        }
    }

    fn no_probe() -> FileTypeProbe {
        FileTypeProbe::new("recode-no-such-file-utility")
    }

    #[test]
    fn display_touches_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let data = temp.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("a.txt"), [0xE9]).unwrap();
        let log = temp.path().join("run.log");

        let detector = Scripted {
            verdict: Detection::new("windows-1252", 0.3),
            seen: RefCell::new(Vec::new()),
        };
        let mut out = Vec::new();
        let summary = run(
            &options(&data, &log, Command::Display),
            &detector,
            &no_probe(),
            &mut out,
        )
        .unwrap();

        assert_eq!(summary.displayed, 1);
        assert!(summary.is_clean());
        assert_eq!(fs::read(data.join("a.txt")).unwrap(), vec![0xE9]);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("[1/1] Encoding for"));
        assert!(printed.contains("-- Detector:    windows-1252 (confidence 0.3)"));
    }

    #[test]
    fn explicit_source_ignores_threshold() {
        let temp = tempfile::tempdir().unwrap();
        let data = temp.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("a.txt"), [0x63, 0x61, 0x66, 0xE9]).unwrap();
        let log = temp.path().join("run.log");

        let detector = Scripted {
            verdict: Detection::new("UTF-8", 0.0),
            seen: RefCell::new(Vec::new()),
        };
        let command = Command::Convert(ConvertOptions {
            source: SourceMode::Explicit(TextEncoding::for_label("latin1").unwrap()),
            target: TextEncoding::utf8(),
            backup_dir: None,
        });
        let mut out = Vec::new();
        let summary = run(&options(&data, &log, command), &detector, &no_probe(), &mut out).unwrap();

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.log_records, 0);
        assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "café");
        // only the post-conversion audit asked the detector
        assert_eq!(detector.seen.borrow().len(), 1);
    }

    #[test]
    fn decode_failure_is_isolated_per_file() {
        let temp = tempfile::tempdir().unwrap();
        let data = temp.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("a.txt"), [0xC3, 0x28, 0xA0]).unwrap();
        fs::write(data.join("b.txt"), "fine").unwrap();
        let log = temp.path().join("run.log");

        let detector = Scripted {
            verdict: Detection::new("UTF-8", 1.0),
            seen: RefCell::new(Vec::new()),
        };
        let command = Command::Convert(ConvertOptions {
            source: SourceMode::Detect {
                threshold: Confidence::DEFAULT,
            },
            target: TextEncoding::utf8(),
            backup_dir: None,
        });
        let mut out = Vec::new();
        let summary = run(&options(&data, &log, command), &detector, &no_probe(), &mut out).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.log_records, 0);
        assert_eq!(fs::read(data.join("a.txt")).unwrap(), vec![0xC3, 0x28, 0xA0]);
        assert_eq!(fs::metadata(&log).unwrap().len(), 0);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("-- Failed: cannot decode"));
        assert!(!printed.contains("[!]"));
    }

    #[test]
    fn missing_root_aborts_before_log_is_created() {
        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("run.log");
        let detector = Scripted {
            verdict: Detection::new("UTF-8", 1.0),
            seen: RefCell::new(Vec::new()),
        };
        let err = run(
            &options(&temp.path().join("missing"), &log, Command::Display),
            &detector,
            &no_probe(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RecodeError::NotFound(_)));
        assert!(!log.exists());
    }
}

//! Operator-facing double check: the detector's verdict next to the OS `file` utility.

use crate::detector::{Detection, EncodingDetector};
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CrossCheck {
    Available(String),
    Unavailable(String),
}

impl fmt::Display for CrossCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossCheck::Available(out) => f.write_str(out),
            CrossCheck::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Runs `<command> -b <path>`, e.g. `file -b notes.txt`.
#[derive(Debug, Clone)]
pub struct FileTypeProbe {
    command: String,
}

impl Default for FileTypeProbe {
    fn default() -> Self {
        Self::new("file")
    }
}

impl FileTypeProbe {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn probe(&self, path: &Path) -> CrossCheck {
        match Command::new(&self.command).arg("-b").arg(path).output() {
            Ok(out) if out.status.success() => {
                CrossCheck::Available(String::from_utf8_lossy(&out.stdout).trim().to_string())
            }
            Ok(out) => CrossCheck::Unavailable(format!(
                "{} exited with {}",
                self.command, out.status
            )),
            Err(e) => CrossCheck::Unavailable(format!("{}: {}", self.command, e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub detection: Detection,
    pub cross_check: CrossCheck,
}

pub fn audit<D: EncodingDetector + ?Sized>(
    path: &Path,
    detector: &D,
    probe: &FileTypeProbe,
) -> Result<AuditReport> {
    let detection = detector.detect(path)?;
    Ok(AuditReport {
        detection,
        cross_check: probe.probe(path),
    })
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Detector:    {}", self.detection)?;
        write!(f, "-- Unix <file>: {}", self.cross_check)
    }
}

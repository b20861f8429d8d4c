use crate::error::{RecodeError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run-wide sink for low-confidence skip records. Created (truncated) once per run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl RunLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| RecodeError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn record_skip(&mut self, file: &Path, confidence: f32) -> Result<()> {
        writeln!(
            self.writer,
            "[WARN] \"{}\": Skipping conversion; confidence too low = {}",
            file.display(),
            confidence
        )
        .map_err(|e| RecodeError::io(&self.path, e))?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Flushes and closes the log, returning how many records it holds.
    pub fn close(mut self) -> Result<usize> {
        self.writer
            .flush()
            .map_err(|e| RecodeError::io(&self.path, e))?;
        Ok(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_skip() {
        let temp = tempfile::tempdir().unwrap();
        let log_path = temp.path().join("run.log");
        let mut log = RunLog::create(&log_path).unwrap();
        assert!(log.is_empty());
        log.record_skip(Path::new("/data/x.txt"), 0.5).unwrap();
        assert_eq!(log.close().unwrap(), 1);

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(
            content,
            "[WARN] \"/data/x.txt\": Skipping conversion; confidence too low = 0.5\n"
        );
    }

    #[test]
    fn create_truncates_previous_run() {
        let temp = tempfile::tempdir().unwrap();
        let log_path = temp.path().join("run.log");
        std::fs::write(&log_path, "stale\n").unwrap();
        RunLog::create(&log_path).unwrap().close().unwrap();
        assert_eq!(std::fs::metadata(&log_path).unwrap().len(), 0);
    }
}

//! zlib pass-through: decompress a stream or every file in a directory, emitting UTF-8 text.

use crate::error::{RecodeError, Result};
use crate::scanner::{self, ScanOptions};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

/// Decompresses a whole zlib stream and decodes the result as UTF-8.
/// `label` names the input in errors.
pub fn inflate<R: Read>(reader: R, label: &Path) -> Result<String> {
    let mut decoder = ZlibDecoder::new(reader);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|source| RecodeError::Decompress {
            path: label.to_path_buf(),
            source,
        })?;
    String::from_utf8(raw).map_err(|_| RecodeError::Decode {
        path: label.to_path_buf(),
        encoding: "UTF-8".to_string(),
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InflateSummary {
    pub done: usize,
    pub failed: usize,
}

/// Inflates every file under `dir` in sorted order. Decompressed text goes to `out`,
/// progress to `status`. A file that fails is reported and skipped.
pub fn inflate_dir<W, S>(dir: &Path, out: &mut W, status: &mut S) -> Result<InflateSummary>
where
    W: Write,
    S: Write,
{
    let tasks = scanner::enumerate(dir, &ScanOptions::default())?;
    let mut summary = InflateSummary::default();
    for task in tasks {
        write!(status, "\nDeflating \"{}\"...", task.path.display()).map_err(RecodeError::Output)?;
        let inflated = File::open(&task.path)
            .map_err(|e| RecodeError::io(&task.path, e))
            .and_then(|file| inflate(file, &task.path));
        match inflated {
            Ok(text) => {
                writeln!(out, "{}", text).map_err(RecodeError::Output)?;
                write!(status, " DONE.").map_err(RecodeError::Output)?;
                summary.done += 1;
            }
            Err(e) => {
                warn!("{}", e);
                write!(status, " FAILED; skipped.").map_err(RecodeError::Output)?;
                summary.failed += 1;
            }
        }
    }
    writeln!(status).map_err(RecodeError::Output)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    fn zlib(bytes: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn inflates_utf8_text() {
        let packed = zlib("héllo wörld".as_bytes());
        let text = inflate(packed.as_slice(), Path::new("<stdin>")).unwrap();
        assert_eq!(text, "héllo wörld");
    }

    #[test]
    fn garbage_is_a_decompress_error() {
        let err = inflate(&b"not zlib at all"[..], Path::new("<stdin>")).unwrap_err();
        assert!(matches!(err, RecodeError::Decompress { .. }));
    }

    #[test]
    fn non_utf8_payload_is_a_decode_error() {
        let packed = zlib(&[0x63, 0xE9]);
        let err = inflate(packed.as_slice(), Path::new("x")).unwrap_err();
        assert!(matches!(err, RecodeError::Decode { .. }));
    }

    #[test]
    fn directory_run_skips_bad_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.z"), zlib(b"first")).unwrap();
        std::fs::write(temp.path().join("b.z"), b"broken").unwrap();
        std::fs::write(temp.path().join("c.z"), zlib(b"third")).unwrap();

        let mut out = Vec::new();
        let mut status = Vec::new();
        let summary = inflate_dir(temp.path(), &mut out, &mut status).unwrap();

        assert_eq!(summary, InflateSummary { done: 2, failed: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "first\nthird\n");
        let status = String::from_utf8(status).unwrap();
        assert!(status.contains("b.z\"... FAILED; skipped."));
        assert!(status.contains("c.z\"... DONE."));
    }
}

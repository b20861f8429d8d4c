//! Rewrites a file in place from one text encoding to another.

use crate::backup;
use crate::encoding::TextEncoding;
use crate::error::{RecodeError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub path: PathBuf,
    pub from: TextEncoding,
    pub to: TextEncoding,
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub backup: Option<PathBuf>,
}

/// Decodes `path` under `from` and writes it back encoded as `to`.
///
/// Nothing is written unless the text decodes cleanly and every character maps
/// into the target. The new content lands in a sibling temp file that then
/// replaces the original, so a failed write leaves the old bytes in place.
pub fn convert_file(
    path: &Path,
    from: TextEncoding,
    to: TextEncoding,
    backup_dir: Option<&Path>,
) -> Result<ConversionReport> {
    let original = fs::read(path).map_err(|e| RecodeError::io(path, e))?;
    let text = from.decode(&original).ok_or_else(|| RecodeError::Decode {
        path: path.to_path_buf(),
        encoding: from.name().to_string(),
    })?;
    let encoded = to.encode(&text).ok_or_else(|| RecodeError::Encode {
        path: path.to_path_buf(),
        encoding: to.name().to_string(),
    })?;

    let backup = match backup_dir {
        Some(dir) => Some(backup::backup_to(path, dir)?),
        None => None,
    };

    replace_contents(path, &encoded)?;
    debug!(
        "rewrote {:?}: {} -> {} ({} -> {} bytes)",
        path,
        from,
        to,
        original.len(),
        encoded.len()
    );

    Ok(ConversionReport {
        path: path.to_path_buf(),
        from,
        to,
        bytes_in: original.len(),
        bytes_out: encoded.len(),
        backup,
    })
}

/// Replaces the file `path` resolves to. A symlink stays a symlink and its target
/// gets the new bytes.
fn replace_contents(path: &Path, bytes: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| RecodeError::io(path, e))?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&target)
        .map_err(|e| RecodeError::io(path, e))?
        .permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RecodeError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| RecodeError::io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RecodeError::io(path, e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| RecodeError::io(path, e))?;
    tmp.persist(&target)
        .map_err(|e| RecodeError::io(path, e.error))?;
    Ok(())
}

use crate::error::{RecodeError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies `src` into `backup_dir` under its own name, or `stem_N.ext` once that is taken.
/// Used by both the text converter and the tag rewriter.
pub fn backup_to(src: &Path, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir).map_err(|e| RecodeError::io(backup_dir, e))?;
    let dest = free_name(backup_dir, src);
    fs::copy(src, &dest).map_err(|e| RecodeError::io(src, e))?;
    Ok(dest)
}

/// First path in `dir` not already taken by an earlier backup of `src`.
fn free_name(dir: &Path, src: &Path) -> PathBuf {
    let plain = dir.join(src.file_name().unwrap_or_else(|| "backup".as_ref()));
    if !plain.exists() {
        return plain;
    }
    let stem = src.file_stem().unwrap_or_else(|| "backup".as_ref());
    (1..)
        .map(|n| {
            let mut name = OsString::from(stem);
            name.push(format!("_{}", n));
            if let Some(ext) = src.extension() {
                name.push(".");
                name.push(ext);
            }
            dir.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(plain)
}

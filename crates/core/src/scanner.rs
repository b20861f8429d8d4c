//! Enumerates candidate files under a root path, filtered by extension and exclude globs.

use crate::error::{RecodeError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extension without the leading dot, matched case-insensitively. `None` keeps every file.
    pub extension: Option<String>,
    pub excludes: Vec<String>,
    /// Prune dot-files and dot-directories below the root.
    pub skip_hidden: bool,
}

impl ScanOptions {
    pub fn with_extension(ext: &str) -> Self {
        Self {
            extension: Some(ext.trim_start_matches('.').to_string()),
            ..Self::default()
        }
    }
}

/// A single file to process, with its 1-based position in the sorted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub order: usize,
}

/// Returns matching files under `root`, sorted lexicographically.
pub fn enumerate(root: &Path, opts: &ScanOptions) -> Result<Vec<FileTask>> {
    if !root.exists() {
        return Err(RecodeError::NotFound(root.to_path_buf()));
    }
    let exclude_set = build_globset(&opts.excludes)?;

    let mut paths = Vec::new();
    if root.is_file() {
        if matches_extension(root, opts.extension.as_deref()) {
            paths.push(root.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || should_descend(e.path(), opts.skip_hidden, &exclude_set)
            })
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if matches_extension(path, opts.extension.as_deref()) {
                paths.push(path.to_path_buf());
            }
        }
    }

    paths.sort();
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| FileTask { path, order: i + 1 })
        .collect())
}

fn matches_extension(path: &Path, ext: Option<&str>) -> bool {
    match ext {
        None => true,
        Some(want) => path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(want))
            .unwrap_or(false),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, skip_hidden: bool, excludes: &GlobSet) -> bool {
    if excludes.is_match(path) {
        return false;
    }
    if skip_hidden && is_hidden(path) {
        return false;
    }
    true
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

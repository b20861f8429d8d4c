//! Normalises ID3v2 tags to v2.4, recovering text frames whose legacy bytes were
//! stored as Latin-1.

use crate::backup;
use crate::decision::{self, Confidence, Decision};
use crate::detector::EncodingDetector;
use crate::error::{RecodeError, Result};
use id3::frame::Content;
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameFix {
    pub id: String,
    pub encoding: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    Rewritten {
        from_version: Version,
        fixes: Vec<FrameFix>,
    },
    AlreadyCurrent,
    NoTag,
}

pub fn convert_tag<D: EncodingDetector + ?Sized>(
    path: &Path,
    detector: &D,
    threshold: Confidence,
    backup_dir: Option<&Path>,
) -> Result<TagOutcome> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => return Ok(TagOutcome::NoTag),
        Err(source) => {
            return Err(RecodeError::Tag {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut fixes = Vec::new();
    for frame in tag.frames() {
        if let Content::Text(text) = frame.content() {
            if let Some(fix) = recover_frame(frame.id(), text, detector, threshold) {
                fixes.push(fix);
            }
        }
    }

    let from_version = tag.version();
    if fixes.is_empty() && from_version == Version::Id3v24 {
        return Ok(TagOutcome::AlreadyCurrent);
    }

    for fix in &fixes {
        debug!("{:?} {}: {:?} -> {:?}", path, fix.id, fix.before, fix.after);
        tag.set_text(fix.id.as_str(), fix.after.clone());
    }
    if let Some(dir) = backup_dir {
        backup::backup_to(path, dir)?;
    }
    tag.write_to_path(path, Version::Id3v24)
        .map_err(|source| RecodeError::Tag {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(TagOutcome::Rewritten {
        from_version,
        fixes,
    })
}

/// Text whose characters all fit in one byte, with at least one high byte, may be
/// another code page read back as Latin-1.
fn legacy_bytes(text: &str) -> Option<Vec<u8>> {
    let mut high = false;
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code > 0xFF {
            return None;
        }
        high |= code >= 0x80;
        bytes.push(code as u8);
    }
    high.then_some(bytes)
}

fn recover_frame<D: EncodingDetector + ?Sized>(
    id: &str,
    text: &str,
    detector: &D,
    threshold: Confidence,
) -> Option<FrameFix> {
    let bytes = legacy_bytes(text)?;
    let detection = detector.detect_bytes(&bytes);
    let encoding = match decision::judge(detection, threshold) {
        Ok(Decision::Proceed { encoding, .. }) => encoding,
        _ => return None,
    };
    if encoding.name() == encoding_rs::WINDOWS_1252.name() {
        return None;
    }
    let decoded = encoding.decode(&bytes)?;
    if decoded == text {
        return None;
    }
    Some(FrameFix {
        id: id.to_string(),
        encoding: encoding.name().to_string(),
        before: text.to_string(),
        after: decoded,
    })
}

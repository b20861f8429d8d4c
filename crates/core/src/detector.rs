//! Encoding detection: a guess plus a confidence score in [0, 1].

use crate::error::{RecodeError, Result};
use encoding_rs::Encoding;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub encoding: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(encoding: impl Into<String>, confidence: f32) -> Self {
        Self {
            encoding: encoding.into(),
            confidence,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (confidence {})", self.encoding, self.confidence)
    }
}

pub trait EncodingDetector {
    fn detect_bytes(&self, bytes: &[u8]) -> Detection;

    fn detect(&self, path: &Path) -> Result<Detection> {
        let bytes = fs::read(path).map_err(|e| RecodeError::io(path, e))?;
        Ok(self.detect_bytes(&bytes))
    }
}

/// `chardetng` guesses the legacy encoding; the score is how cleanly and plausibly
/// the bytes decode under that guess.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetDetector;

/// Ceiling for anything short of a BOM or pure ASCII.
const HEURISTIC_CEILING: f32 = 0.99;

impl EncodingDetector for ChardetDetector {
    fn detect_bytes(&self, bytes: &[u8]) -> Detection {
        if bytes.is_empty() {
            return Detection::new(encoding_rs::UTF_8.name(), 1.0);
        }
        if let Some((enc, _)) = Encoding::for_bom(bytes) {
            return Detection::new(enc.name(), 1.0);
        }
        if bytes.contains(&0) {
            return Detection::new(guess_legacy(bytes).name(), 0.0);
        }
        if std::str::from_utf8(bytes).is_ok() {
            let confidence = if bytes.is_ascii() {
                1.0
            } else {
                HEURISTIC_CEILING
            };
            return Detection::new(encoding_rs::UTF_8.name(), confidence);
        }

        let guess = guess_legacy(bytes);
        let confidence = match guess.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => HEURISTIC_CEILING * plausibility(&text),
            None => 0.0,
        };
        Detection::new(guess.name(), confidence)
    }
}

fn guess_legacy(bytes: &[u8]) -> &'static Encoding {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, false)
}

/// Share of the suspicious characters (non-ASCII or control) that look like real text.
fn plausibility(text: &str) -> f32 {
    let mut considered = 0usize;
    let mut plausible = 0usize;
    for c in text.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            continue;
        }
        if matches!(c, '\t' | '\n' | '\r' | '\x0c') {
            continue;
        }
        considered += 1;
        if is_plausible(c) {
            plausible += 1;
        }
    }
    if considered == 0 {
        1.0
    } else {
        plausible as f32 / considered as f32
    }
}

fn is_plausible(c: char) -> bool {
    if c.is_control() || c == char::REPLACEMENT_CHARACTER {
        return false;
    }
    // private use area
    if ('\u{E000}'..='\u{F8FF}').contains(&c) {
        return false;
    }
    true
}

//! Chooses the source encoding for one file: explicit, or detected above a threshold.

use crate::detector::{Detection, EncodingDetector};
use crate::encoding::TextEncoding;
use crate::error::{RecodeError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Detection threshold, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Confidence(f32);

impl Confidence {
    pub const DEFAULT: Confidence = Confidence(0.8);

    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Confidence(value))
        } else {
            Err(RecodeError::InvalidConfidence(value.to_string()))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::DEFAULT
    }
}

impl FromStr for Confidence {
    type Err = RecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f32 = s
            .trim()
            .parse()
            .map_err(|_| RecodeError::InvalidConfidence(s.to_string()))?;
        Confidence::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exactly one way of picking the source encoding is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceMode {
    Explicit(TextEncoding),
    Detect { threshold: Confidence },
}

impl Default for SourceMode {
    fn default() -> Self {
        SourceMode::Detect {
            threshold: Confidence::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Proceed {
        encoding: TextEncoding,
        /// `None` when the encoding was given explicitly.
        detection: Option<Detection>,
    },
    Skip {
        confidence: f32,
        threshold: Confidence,
    },
}

pub fn decide<D: EncodingDetector + ?Sized>(
    path: &Path,
    mode: &SourceMode,
    detector: &D,
) -> Result<Decision> {
    match mode {
        SourceMode::Explicit(encoding) => Ok(Decision::Proceed {
            encoding: *encoding,
            detection: None,
        }),
        SourceMode::Detect { threshold } => {
            let detection = detector.detect(path)?;
            judge(detection, *threshold)
        }
    }
}

/// Applies the threshold to a detector verdict.
pub fn judge(detection: Detection, threshold: Confidence) -> Result<Decision> {
    if detection.confidence < threshold.value() {
        return Ok(Decision::Skip {
            confidence: detection.confidence,
            threshold,
        });
    }
    let encoding = TextEncoding::for_label(&detection.encoding)?;
    Ok(Decision::Proceed {
        encoding,
        detection: Some(detection),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed {
        detection: Detection,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(encoding: &str, confidence: f32) -> Self {
            Self {
                detection: Detection::new(encoding, confidence),
                calls: Cell::new(0),
            }
        }
    }

    impl EncodingDetector for Fixed {
        fn detect_bytes(&self, _bytes: &[u8]) -> Detection {
            self.calls.set(self.calls.get() + 1);
            self.detection.clone()
        }

        fn detect(&self, _path: &Path) -> Result<Detection> {
            Ok(self.detect_bytes(&[]))
        }
    }

    #[test]
    fn proceeds_iff_confidence_meets_threshold() {
        let threshold = Confidence::new(0.8).unwrap();
        let mode = SourceMode::Detect { threshold };
        for (c, proceed) in [(0.0, false), (0.5, false), (0.79, false), (0.8, true), (1.0, true)] {
            let detector = Fixed::new("windows-1252", c);
            let decision = decide(Path::new("x.txt"), &mode, &detector).unwrap();
            assert_eq!(matches!(decision, Decision::Proceed { .. }), proceed, "c = {c}");
            assert_eq!(detector.calls.get(), 1);
        }
    }

    #[test]
    fn skip_carries_confidence_and_threshold() {
        let detector = Fixed::new("UTF-8", 0.5);
        let decision = decide(Path::new("x.txt"), &SourceMode::default(), &detector).unwrap();
        assert_eq!(
            decision,
            Decision::Skip {
                confidence: 0.5,
                threshold: Confidence::DEFAULT
            }
        );
    }

    #[test]
    fn explicit_source_never_consults_detector() {
        let detector = Fixed::new("UTF-8", 0.0);
        let latin = TextEncoding::for_label("latin1").unwrap();
        let decision =
            decide(Path::new("x.txt"), &SourceMode::Explicit(latin), &detector).unwrap();
        assert_eq!(
            decision,
            Decision::Proceed {
                encoding: latin,
                detection: None
            }
        );
        assert_eq!(detector.calls.get(), 0);
    }

    #[test]
    fn unknown_detected_encoding_is_an_error() {
        let detector = Fixed::new("martian", 0.95);
        let err = decide(Path::new("x.txt"), &SourceMode::default(), &detector).unwrap_err();
        assert!(matches!(err, RecodeError::UnknownEncoding(_)));
    }

    #[test]
    fn confidence_parsing_is_range_checked() {
        assert_eq!("0.5".parse::<Confidence>().unwrap().value(), 0.5);
        assert!("1.5".parse::<Confidence>().is_err());
        assert!("-0.1".parse::<Confidence>().is_err());
        assert!("NaN".parse::<Confidence>().is_err());
        assert!("high".parse::<Confidence>().is_err());
    }
}

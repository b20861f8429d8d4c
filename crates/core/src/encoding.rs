//! Named text encodings backed by `encoding_rs`, plus the UTF-16 writers it lacks.

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};
use std::fmt;

use crate::error::RecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Codec(&'static Encoding),
    /// UTF-16 with an explicit byte order. `bom` writes a byte-order mark and,
    /// when decoding, lets a leading mark pick the byte order.
    Utf16 { big_endian: bool, bom: bool },
}

impl TextEncoding {
    pub fn utf8() -> Self {
        TextEncoding::Codec(encoding_rs::UTF_8)
    }

    /// Resolves an encoding label. Accepts WHATWG labels plus a few common spellings
    /// such as `latin-1` and `utf_8`.
    pub fn for_label(label: &str) -> Result<Self, RecodeError> {
        let norm = label.trim().to_ascii_lowercase().replace('_', "-");
        match norm.as_str() {
            "utf-16" | "utf16" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: false,
                    bom: true,
                })
            }
            "utf-16le" | "utf16le" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: false,
                    bom: false,
                })
            }
            "utf-16be" | "utf16be" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: true,
                    bom: false,
                })
            }
            _ => {}
        }
        let alias = match norm.as_str() {
            "latin-1" => "latin1",
            other => other,
        };
        let found = Encoding::for_label(label.trim().as_bytes())
            .or_else(|| Encoding::for_label(alias.as_bytes()));
        match found {
            Some(enc) if enc == REPLACEMENT => Err(RecodeError::UnknownEncoding(label.to_string())),
            Some(enc) if enc == UTF_16LE => Ok(TextEncoding::Utf16 {
                big_endian: false,
                bom: false,
            }),
            Some(enc) if enc == UTF_16BE => Ok(TextEncoding::Utf16 {
                big_endian: true,
                bom: false,
            }),
            Some(enc) => Ok(TextEncoding::Codec(enc)),
            None => Err(RecodeError::UnknownEncoding(label.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Codec(enc) => enc.name(),
            TextEncoding::Utf16 { bom: true, .. } => "UTF-16",
            TextEncoding::Utf16 {
                big_endian: false, ..
            } => "UTF-16LE",
            TextEncoding::Utf16 {
                big_endian: true, ..
            } => "UTF-16BE",
        }
    }

    /// Strict decode. Returns `None` on any malformed sequence. A leading BOM that
    /// belongs to this encoding is dropped.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match *self {
            TextEncoding::Codec(enc) => {
                let body = match Encoding::for_bom(bytes) {
                    Some((bom_enc, len)) if bom_enc == enc => &bytes[len..],
                    _ => bytes,
                };
                enc.decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Utf16 { big_endian, bom } => {
                let (enc, body) = match Encoding::for_bom(bytes) {
                    Some((bom_enc, len)) if bom && (bom_enc == UTF_16LE || bom_enc == UTF_16BE) => {
                        (bom_enc, &bytes[len..])
                    }
                    Some((bom_enc, len)) if bom_enc == utf16_codec(big_endian) => {
                        (bom_enc, &bytes[len..])
                    }
                    _ => (utf16_codec(big_endian), bytes),
                };
                enc.decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
        }
    }

    /// Strict encode. Returns `None` when `text` holds characters the encoding cannot represent.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match *self {
            TextEncoding::Codec(enc) => {
                let (bytes, _, had_errors) = enc.encode(text);
                if had_errors {
                    None
                } else {
                    Some(bytes.into_owned())
                }
            }
            TextEncoding::Utf16 { big_endian, bom } => {
                let mut out = Vec::with_capacity(text.len() * 2 + 2);
                if bom {
                    let mark: [u8; 2] = if big_endian { [0xFE, 0xFF] } else { [0xFF, 0xFE] };
                    out.extend_from_slice(&mark);
                }
                for unit in text.encode_utf16() {
                    let pair = if big_endian {
                        unit.to_be_bytes()
                    } else {
                        unit.to_le_bytes()
                    };
                    out.extend_from_slice(&pair);
                }
                Some(out)
            }
        }
    }
}

fn utf16_codec(big_endian: bool) -> &'static Encoding {
    if big_endian {
        UTF_16BE
    } else {
        UTF_16LE
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = RecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextEncoding::for_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_common_labels() {
        assert_eq!(TextEncoding::for_label("utf-8").unwrap(), TextEncoding::utf8());
        assert_eq!(TextEncoding::for_label("UTF_8").unwrap(), TextEncoding::utf8());
        assert_eq!(TextEncoding::for_label("latin-1").unwrap().name(), "windows-1252");
        assert_eq!(TextEncoding::for_label("cp1251").unwrap().name(), "windows-1251");
        assert_eq!(TextEncoding::for_label("utf-16").unwrap().name(), "UTF-16");
        assert_eq!(TextEncoding::for_label("UTF-16BE").unwrap().name(), "UTF-16BE");
    }

    #[test]
    fn labels_with_underscores_resolve_as_written() {
        let enc = TextEncoding::for_label("iso_8859-1:1987").unwrap();
        assert_eq!(enc.name(), "windows-1252");
        assert_eq!(
            TextEncoding::for_label("iso_8859-2").unwrap().name(),
            "ISO-8859-2"
        );
    }

    #[test]
    fn rejects_unknown_and_replacement_labels() {
        assert!(matches!(
            TextEncoding::for_label("klingon-8"),
            Err(RecodeError::UnknownEncoding(_))
        ));
        assert!(matches!(
            TextEncoding::for_label("iso-2022-kr"),
            Err(RecodeError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn strict_decode_rejects_malformed_input() {
        assert_eq!(TextEncoding::utf8().decode(&[0x63, 0x61, 0x66, 0xE9]), None);
        let latin = TextEncoding::for_label("latin1").unwrap();
        assert_eq!(latin.decode(&[0x63, 0x61, 0x66, 0xE9]).as_deref(), Some("café"));
    }

    #[test]
    fn decode_strips_matching_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(TextEncoding::utf8().decode(&bytes).as_deref(), Some("hi"));

        let utf16 = TextEncoding::for_label("utf-16").unwrap();
        assert_eq!(utf16.decode(&[0xFE, 0xFF, 0x00, b'h']).as_deref(), Some("h"));
        assert_eq!(utf16.decode(&[0xFF, 0xFE, b'h', 0x00]).as_deref(), Some("h"));
    }

    #[test]
    fn encode_refuses_unmappable_characters() {
        let latin = TextEncoding::for_label("latin1").unwrap();
        assert_eq!(latin.encode("café"), Some(vec![0x63, 0x61, 0x66, 0xE9]));
        assert_eq!(latin.encode("日本"), None);
    }

    #[test]
    fn utf16_writers() {
        let with_bom = TextEncoding::for_label("utf-16").unwrap();
        assert_eq!(with_bom.encode("é").unwrap(), vec![0xFF, 0xFE, 0xE9, 0x00]);
        let be = TextEncoding::for_label("utf-16be").unwrap();
        assert_eq!(be.encode("é").unwrap(), vec![0x00, 0xE9]);
        assert_eq!(be.decode(&[0x00, 0xE9]).as_deref(), Some("é"));
    }
}

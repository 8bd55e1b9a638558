//! Text encodings for maintenance response bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF32_LE_BOM: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];

/// Text encoding of a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8, the fallback when no byte-order mark is present.
    #[default]
    Utf8,
    /// UTF-16, little endian.
    Utf16Le,
    /// UTF-16, big endian.
    Utf16Be,
}

impl TextEncoding {
    /// Detects the encoding from a leading byte-order mark.
    ///
    /// Returns the encoding and the content with the BOM stripped.
    /// Content without a BOM is treated as UTF-8 and returned unchanged.
    ///
    /// UTF-32 is not supported; check [`TextEncoding::unsupported_bom`] first,
    /// since a UTF-32LE mark also starts with the UTF-16LE one.
    #[must_use]
    pub fn detect(raw: &[u8]) -> (Self, &[u8]) {
        if let Some(rest) = raw.strip_prefix(&UTF8_BOM) {
            (Self::Utf8, rest)
        } else if let Some(rest) = raw.strip_prefix(&UTF16_LE_BOM) {
            (Self::Utf16Le, rest)
        } else if let Some(rest) = raw.strip_prefix(&UTF16_BE_BOM) {
            (Self::Utf16Be, rest)
        } else {
            (Self::Utf8, raw)
        }
    }

    /// Returns the name of a UTF-32 byte-order mark at the start of `raw`.
    #[must_use]
    pub fn unsupported_bom(raw: &[u8]) -> Option<&'static str> {
        if raw.starts_with(&UTF32_LE_BOM) {
            Some("utf-32le")
        } else if raw.starts_with(&UTF32_BE_BOM) {
            Some("utf-32be")
        } else {
            None
        }
    }

    /// Encodes text without a byte-order mark.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// Decodes bytes, replacing invalid sequences with U+FFFD.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        }
    }

    /// Charset label as used in HTTP.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    // A trailing odd byte cannot form a code unit and decodes as a replacement.
    let units = bytes.chunks(2).map(|pair| match pair {
        [a, b] => unit([*a, *b]),
        _ => 0xFFFD,
    });

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

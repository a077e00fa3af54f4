//! Content hashes and their textual forms.
//!
//! The native library identifies objects by a 20-byte hash, exchanged with
//! the host runtime as 40 hex characters. Lookup operations additionally
//! accept any unambiguous hex prefix, including odd-length ones; prefix
//! resolution against the object store happens inside the native library,
//! this module only validates and packs the text.

use std::fmt;

use crate::error::{Error, Result};

/// Raw hash length in bytes.
pub const RAW_LEN: usize = 20;

/// Full textual hash length in hex characters.
pub const HEX_LEN: usize = RAW_LEN * 2;

/// A full 20-byte object id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Oid {
    raw: [u8; RAW_LEN],
}

impl Oid {
    /// Parse a full 40-hex-character id.
    ///
    /// Case-insensitive on input; anything that is not exactly 40 hex
    /// digits is a [`Error::MalformedIdentifier`], reported before any
    /// native call.
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != HEX_LEN {
            return Err(Error::MalformedIdentifier(text.to_owned()));
        }
        let mut raw = [0u8; RAW_LEN];
        hex::decode_to_slice(text, &mut raw)
            .map_err(|_| Error::MalformedIdentifier(text.to_owned()))?;
        Ok(Self { raw })
    }

    /// Wrap a raw 20-byte id returned by the native library.
    #[inline]
    pub const fn from_raw(raw: [u8; RAW_LEN]) -> Self {
        Self { raw }
    }

    /// Raw bytes, in the layout the native library expects.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.raw
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.raw))
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({self})")
    }
}

/// A hex prefix of an object id, 1 to 40 digits.
///
/// Odd digit counts are allowed; the trailing nibble is packed high, the
/// way the native prefix-lookup calls expect.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OidPrefix {
    raw: [u8; RAW_LEN],
    hex_len: usize,
}

impl OidPrefix {
    /// Parse a hex prefix.
    ///
    /// Empty input, more than 40 digits, or any non-hex character is a
    /// [`Error::MalformedIdentifier`].
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.is_empty() || text.len() > HEX_LEN {
            return Err(Error::MalformedIdentifier(text.to_owned()));
        }
        let mut raw = [0u8; RAW_LEN];
        for (i, ch) in text.bytes().enumerate() {
            let nibble = match (ch as char).to_digit(16) {
                Some(n) => n as u8,
                None => return Err(Error::MalformedIdentifier(text.to_owned())),
            };
            if i % 2 == 0 {
                raw[i / 2] = nibble << 4;
            } else {
                raw[i / 2] |= nibble;
            }
        }
        Ok(Self {
            raw,
            hex_len: text.len(),
        })
    }

    /// Number of hex digits in the prefix.
    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.hex_len
    }

    /// True if this is a full 40-digit id.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.hex_len == HEX_LEN
    }

    /// Raw packed bytes; only the first `hex_len` nibbles are meaningful.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.raw
    }
}

impl fmt::Display for OidPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = hex::encode(self.raw);
        f.write_str(&full[..self.hex_len])
    }
}

impl fmt::Debug for OidPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OidPrefix({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn full_id_roundtrips_lowercase() {
        let oid = Oid::from_hex(SAMPLE).unwrap();
        assert_eq!(oid.to_string(), SAMPLE);
    }

    #[test]
    fn full_id_accepts_uppercase() {
        let upper = SAMPLE.to_uppercase();
        let oid = Oid::from_hex(&upper).unwrap();
        assert_eq!(oid.to_string(), SAMPLE);
    }

    #[test]
    fn full_id_rejects_wrong_length() {
        assert!(Oid::from_hex("").unwrap_err().is_malformed_identifier());
        assert!(Oid::from_hex(&SAMPLE[..39])
            .unwrap_err()
            .is_malformed_identifier());
        let long = format!("{SAMPLE}0");
        assert!(Oid::from_hex(&long).unwrap_err().is_malformed_identifier());
    }

    #[test]
    fn full_id_rejects_non_hex() {
        let bad = format!("g{}", &SAMPLE[1..]);
        assert!(Oid::from_hex(&bad).unwrap_err().is_malformed_identifier());
    }

    #[test]
    fn odd_length_prefix_packs_high_nibble() {
        let prefix = OidPrefix::from_hex("a1b2c3d").unwrap();
        assert_eq!(prefix.hex_len(), 7);
        assert_eq!(&prefix.as_bytes()[..4], &[0xa1, 0xb2, 0xc3, 0xd0]);
        assert_eq!(prefix.to_string(), "a1b2c3d");
    }

    #[test]
    fn prefix_rejects_non_hex() {
        let err = OidPrefix::from_hex("a1b2c3g").unwrap_err();
        assert!(err.is_malformed_identifier());
    }

    #[test]
    fn prefix_rejects_empty_and_overlong() {
        assert!(OidPrefix::from_hex("").unwrap_err().is_malformed_identifier());
        let long = format!("{SAMPLE}0");
        assert!(OidPrefix::from_hex(&long)
            .unwrap_err()
            .is_malformed_identifier());
    }

    #[test]
    fn full_prefix_matches_full_oid_bytes() {
        let prefix = OidPrefix::from_hex(SAMPLE).unwrap();
        let oid = Oid::from_hex(SAMPLE).unwrap();
        assert!(prefix.is_full());
        assert_eq!(prefix.as_bytes(), oid.as_bytes());
    }

    proptest! {
        #[test]
        fn any_hex_prefix_parses(text in "[0-9a-fA-F]{1,40}") {
            let prefix = OidPrefix::from_hex(&text).unwrap();
            prop_assert_eq!(prefix.hex_len(), text.len());
            prop_assert_eq!(prefix.to_string(), text.to_lowercase());
        }

        #[test]
        fn any_non_hex_char_is_rejected(
            head in "[0-9a-f]{0,10}",
            bad in "[g-z]",
            tail in "[0-9a-f]{0,10}",
        ) {
            let text = format!("{head}{bad}{tail}");
            prop_assert!(OidPrefix::from_hex(&text)
                .unwrap_err()
                .is_malformed_identifier());
        }
    }
}

//! Token encoding and decoding.

use crate::error::{CodecError, CodecResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Padding character used at the end of a token.
pub const PAD: u8 = b'=';

/// Encodes bytes into a printable token.
///
/// Never fails. The empty input encodes to the empty token.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a token back into bytes.
///
/// # Errors
///
/// Returns an error if the token length, alphabet or padding is invalid.
/// No partial output is ever returned.
pub fn decode(token: &str) -> CodecResult<Vec<u8>> {
    Ok(STANDARD.decode(token)?)
}

/// Returns the length of the token produced for `len` input bytes.
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Returns the exact number of bytes `token` decodes to.
///
/// Checks the token's shape (length, alphabet, padding placement) without
/// allocating. A token accepted here can still be rejected by [`decode`] for
/// non-zero trailing bits.
///
/// # Errors
///
/// Returns an error if the token is structurally invalid.
pub fn decoded_len(token: &str) -> CodecResult<usize> {
    let bytes = token.as_bytes();
    if bytes.len() % 4 != 0 {
        return Err(CodecError::InvalidLength { len: bytes.len() });
    }

    let padding = bytes.iter().rev().take_while(|&&b| b == PAD).count();
    if padding > 2 {
        return Err(CodecError::InvalidPadding);
    }

    let body = &bytes[..bytes.len() - padding];
    if let Some(offset) = body.iter().position(|&b| !is_alphabet(b)) {
        let byte = body[offset];
        return Err(if byte == PAD {
            CodecError::InvalidPadding
        } else {
            CodecError::InvalidByte { offset, byte }
        });
    }

    Ok(bytes.len() / 4 * 3 - padding)
}

/// Returns whether `token` can be embedded verbatim on one `key=value` line.
///
/// Every token produced by [`encode`] is safe.
#[must_use]
pub fn is_token_safe(token: &str) -> bool {
    let bytes = token.as_bytes();
    let padding = bytes.iter().rev().take_while(|&&b| b == PAD).count();
    padding <= 2 && bytes[..bytes.len() - padding].iter().all(|&b| is_alphabet(b))
}

const fn is_alphabet(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_roundtrip() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decoded_len("").unwrap(), 0);
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(&[0x00, 0x00, 0x00]), "AAAA");
        assert_eq!(encode(&[0xFF, 0xFF, 0xFF]), "////");
    }

    #[test]
    fn every_byte_value_roundtrips() {
        let all: Vec<u8> = (0..=255u8).collect();
        let token = encode(&all);
        assert!(is_token_safe(&token));
        assert_eq!(decode(&token).unwrap(), all);
        assert_eq!(decoded_len(&token).unwrap(), 256);
    }

    #[test]
    fn max_value_roundtrips() {
        let data = vec![0xA5u8; u16::MAX as usize];
        let token = encode(&data);
        assert_eq!(token.len(), encoded_len(data.len()));
        assert_eq!(decode(&token).unwrap(), data);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(matches!(
            decode("Zm9"),
            Err(CodecError::InvalidLength { .. }) | Err(CodecError::InvalidPadding)
        ));
        assert_eq!(decoded_len("Zm9"), Err(CodecError::InvalidLength { len: 3 }));
    }

    #[test]
    fn rejects_bad_alphabet() {
        assert!(matches!(
            decode("Zm9*"),
            Err(CodecError::InvalidByte { offset: 3, byte: b'*' })
        ));
        assert_eq!(
            decoded_len("Zm 9"),
            Err(CodecError::InvalidByte { offset: 2, byte: b' ' })
        );
    }

    #[test]
    fn rejects_misplaced_padding() {
        assert!(decode("Z=9v").is_err());
        assert_eq!(decoded_len("Z=9v"), Err(CodecError::InvalidPadding));
        assert_eq!(decoded_len("Z==="), Err(CodecError::InvalidPadding));
    }

    #[test]
    fn rejects_non_canonical_trailing_bits() {
        // "Zh==" carries bits that "Zg==" does not.
        assert!(matches!(
            decode("Zh=="),
            Err(CodecError::InvalidLastSymbol { .. })
        ));
    }

    #[test]
    fn token_safety() {
        assert!(is_token_safe("Zm8="));
        assert!(!is_token_safe("Zm8=\n"));
        assert!(!is_token_safe("a=b="));
        assert!(!is_token_safe("a b"));
    }

    proptest! {
        #[test]
        fn roundtrip_any_bytes(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let token = encode(&data);
            prop_assert!(is_token_safe(&token));
            prop_assert_eq!(token.len(), encoded_len(data.len()));
            prop_assert_eq!(decoded_len(&token).unwrap(), data.len());
            prop_assert_eq!(decode(&token).unwrap(), data);
        }
    }
}

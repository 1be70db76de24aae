//! Text-safe encodings for envelopes

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{CryptoError, Result};

/// Standard base64 with padding
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, surrounding whitespace ignored
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::MalformedInput(format!("invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_standard_alphabet() {
        assert_eq!(encode_base64(&[0xfb, 0xff]), "+/8=");
        assert_eq!(decode_base64("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_rejects_non_base64() {
        assert!(matches!(
            decode_base64("not*base64"),
            Err(CryptoError::MalformedInput(_))
        ));
    }
}

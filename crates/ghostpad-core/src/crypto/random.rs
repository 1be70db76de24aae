//! Secure random byte source

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, Result};

/// Source of cryptographically secure random bytes
pub trait RandomSource: Send + Sync {
    /// Fill `buf` entirely with random bytes
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CryptoError::Unavailable(format!("secure random source: {}", e)))
    }
}

/// Produce a fixed-size array of random bytes
pub fn random_array<const N: usize>(source: &dyn RandomSource) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    source.fill(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_arrays_differ() {
        let a: [u8; 16] = random_array(&OsRandom).unwrap();
        let b: [u8; 16] = random_array(&OsRandom).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_length_fill() {
        let empty: [u8; 0] = random_array(&OsRandom).unwrap();
        assert!(empty.is_empty());
    }
}

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Master key and salt (`key || salt`) with an optional MKI tag.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: Vec<u8>,
    mki_id: Vec<u8>,
}

impl MasterKey {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            mki_id: Vec::new(),
        }
    }

    pub fn with_mki(key: impl Into<Vec<u8>>, mki_id: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            mki_id: mki_id.into(),
        }
    }

    /// Fresh `key || salt` of `len` bytes from the OS generator, e.g.
    /// `CryptoPolicy::cipher_key_len` bytes for SDES keying.
    pub fn random(len: usize) -> Self {
        let mut key = vec![0u8; len];
        OsRng.fill_bytes(&mut key);
        Self::new(key)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn mki_id(&self) -> &[u8] {
        &self.mki_id
    }

    pub fn mki_size(&self) -> usize {
        self.mki_id.len()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("key_len", &self.key.len())
            .field("mki_id", &self.mki_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn random_keys_differ() {
        let a = MasterKey::random(30);
        let b = MasterKey::random(30);
        assert_eq!(a.key().len(), 30);
        assert_ne!(a, b);
        assert!(a.mki_id().is_empty());
    }

    #[test]
    fn debug_hides_key_bytes() {
        let k = MasterKey::with_mki(vec![0xabu8; 30], vec![1, 2]);
        let s = format!("{k:?}");
        assert!(!s.contains("171"));
        assert!(s.contains("key_len: 30"));
        assert_eq!(k.mki_size(), 2);
    }
}

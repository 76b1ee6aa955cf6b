//! Packet ciphers.
//!
//! Every cipher is keyed with `key || salt` once, then given a fresh IV per
//! packet. The counter-mode ciphers also hand out raw keystream through
//! [`SrtpCipher::output`], which header-extension encryption and key
//! derivation rely on.

pub mod aes_gcm;
pub mod aes_icm;
pub mod null_cipher;

use std::fmt;

use crate::srtp::constants::{
    AEAD_SALT_LEN, AES_128_KEY_LEN, AES_192_KEY_LEN, AES_256_KEY_LEN, SALT_LEN,
};
use crate::srtp::srtp_error::SrtpError;

pub use aes_gcm::AesGcm;
pub use aes_icm::AesIcm;
pub use null_cipher::NullCipher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherType {
    Null,
    AesIcm128,
    AesIcm192,
    AesIcm256,
    AesGcm128,
    AesGcm256,
}

impl CipherType {
    /// Salt bytes that follow the key in the keying material.
    pub fn salt_len(self) -> usize {
        use CipherType::*;
        match self {
            Null => 0,
            AesIcm128 | AesIcm192 | AesIcm256 => SALT_LEN,
            AesGcm128 | AesGcm256 => AEAD_SALT_LEN,
        }
    }

    /// Length of the AES key alone.
    pub fn base_key_len(self) -> usize {
        use CipherType::*;
        match self {
            Null => 0,
            AesIcm128 | AesGcm128 => AES_128_KEY_LEN,
            AesIcm192 => AES_192_KEY_LEN,
            AesIcm256 | AesGcm256 => AES_256_KEY_LEN,
        }
    }

    pub fn key_len_with_salt(self) -> usize {
        self.base_key_len() + self.salt_len()
    }

    pub fn is_aead(self) -> bool {
        matches!(self, CipherType::AesGcm128 | CipherType::AesGcm256)
    }

    /// Cipher used to encrypt RTP header extensions under this packet cipher.
    /// GCM streams fall back to counter mode of the same key size.
    pub fn header_extension_cipher(self) -> CipherType {
        match self {
            CipherType::AesGcm128 => CipherType::AesIcm128,
            CipherType::AesGcm256 => CipherType::AesIcm256,
            other => other,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        use CipherType::*;
        match name {
            "null" => Some(Null),
            "aes_icm_128" => Some(AesIcm128),
            "aes_icm_192" => Some(AesIcm192),
            "aes_icm_256" => Some(AesIcm256),
            "aes_gcm_128" => Some(AesGcm128),
            "aes_gcm_256" => Some(AesGcm256),
            _ => None,
        }
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CipherType::*;
        let name = match self {
            Null => "null",
            AesIcm128 => "aes_icm_128",
            AesIcm192 => "aes_icm_192",
            AesIcm256 => "aes_icm_256",
            AesGcm128 => "aes_gcm_128",
            AesGcm256 => "aes_gcm_256",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherDirection {
    Encrypt,
    Decrypt,
}

pub trait SrtpCipher: Send {
    fn cipher_type(&self) -> CipherType;

    /// Length of the keying material (`key || salt`) accepted by `init`.
    fn key_len(&self) -> usize;

    fn tag_len(&self) -> usize {
        0
    }

    fn init(&mut self, key: &[u8]) -> Result<(), SrtpError>;

    /// Counter-mode ciphers take a 16 byte IV, GCM a 12 byte nonce.
    fn set_iv(&mut self, iv: &[u8], direction: CipherDirection) -> Result<(), SrtpError>;

    /// Appends associated data for the next AEAD operation.
    fn set_aad(&mut self, _aad: &[u8]) -> Result<(), SrtpError> {
        Err(SrtpError::CipherFail)
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<(), SrtpError>;

    /// Decrypts in place and returns the plaintext length. AEAD ciphers
    /// expect the tag at the end of `buf` and verify it.
    fn decrypt(&mut self, buf: &mut [u8]) -> Result<usize, SrtpError>;

    /// Writes raw keystream, continuing from the current position.
    fn output(&mut self, _out: &mut [u8]) -> Result<(), SrtpError> {
        Err(SrtpError::CipherFail)
    }

    /// Copies the tag of the last AEAD encryption into `out`.
    fn get_tag(&mut self, _out: &mut [u8]) -> Result<usize, SrtpError> {
        Err(SrtpError::CipherFail)
    }

    fn box_clone(&self) -> Box<dyn SrtpCipher>;
}

impl Clone for Box<dyn SrtpCipher> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Allocates an unkeyed cipher. `tag_len` only matters for GCM (8 or 16).
pub fn new_cipher(
    cipher_type: CipherType,
    key_len: usize,
    tag_len: usize,
) -> Result<Box<dyn SrtpCipher>, SrtpError> {
    use CipherType::*;
    match cipher_type {
        Null => Ok(Box::new(NullCipher::new(key_len))),
        AesIcm128 | AesIcm192 | AesIcm256 => Ok(Box::new(AesIcm::new(cipher_type, key_len)?)),
        AesGcm128 | AesGcm256 => Ok(Box::new(AesGcm::new(cipher_type, key_len, tag_len)?)),
    }
}

/// Runs the known-answer test of the given cipher type.
pub fn self_test(cipher_type: CipherType) -> Result<(), SrtpError> {
    use CipherType::*;
    match cipher_type {
        Null => null_cipher::self_test(),
        AesIcm128 | AesIcm192 | AesIcm256 => aes_icm::self_test(cipher_type),
        AesGcm128 | AesGcm256 => aes_gcm::self_test(cipher_type),
    }
}

pub(crate) fn unhex(s: &str) -> Result<Vec<u8>, SrtpError> {
    hex::decode(s).map_err(|_| SrtpError::CipherFail)
}

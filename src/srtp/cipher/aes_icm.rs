use aes::cipher::{KeyIvInit, StreamCipher};
use aes::{Aes128, Aes192, Aes256};
use ctr::Ctr128BE;
use zeroize::Zeroizing;

use crate::srtp::cipher::{CipherDirection, CipherType, SrtpCipher, unhex};
use crate::srtp::constants::SALT_LEN;
use crate::srtp::srtp_error::SrtpError;

#[derive(Clone)]
enum IcmKeystream {
    Aes128(Ctr128BE<Aes128>),
    Aes192(Ctr128BE<Aes192>),
    Aes256(Ctr128BE<Aes256>),
}

impl IcmKeystream {
    fn new(cipher_type: CipherType, key: &[u8], counter: &[u8; 16]) -> Result<Self, SrtpError> {
        let ks = match cipher_type {
            CipherType::AesIcm128 => {
                Self::Aes128(Ctr128BE::new_from_slices(key, counter).map_err(|_| SrtpError::InitFail)?)
            }
            CipherType::AesIcm192 => {
                Self::Aes192(Ctr128BE::new_from_slices(key, counter).map_err(|_| SrtpError::InitFail)?)
            }
            CipherType::AesIcm256 => {
                Self::Aes256(Ctr128BE::new_from_slices(key, counter).map_err(|_| SrtpError::InitFail)?)
            }
            _ => return Err(SrtpError::BadParam),
        };
        Ok(ks)
    }

    fn apply(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.apply_keystream(buf),
            Self::Aes192(c) => c.apply_keystream(buf),
            Self::Aes256(c) => c.apply_keystream(buf),
        }
    }
}

/// AES in integer counter mode (RFC 3711 §4.1.1).
///
/// Keyed with `key || 14-byte salt`; the initial counter block is the
/// per-packet IV XOR the salt, with the low 16 bits counting blocks.
#[derive(Clone)]
pub struct AesIcm {
    cipher_type: CipherType,
    key: Zeroizing<Vec<u8>>,
    salt: [u8; 16],
    keystream: Option<IcmKeystream>,
}

impl AesIcm {
    pub fn new(cipher_type: CipherType, key_len: usize) -> Result<Self, SrtpError> {
        if !matches!(
            cipher_type,
            CipherType::AesIcm128 | CipherType::AesIcm192 | CipherType::AesIcm256
        ) || key_len != cipher_type.key_len_with_salt()
        {
            return Err(SrtpError::BadParam);
        }
        Ok(Self {
            cipher_type,
            key: Zeroizing::new(Vec::new()),
            salt: [0u8; 16],
            keystream: None,
        })
    }

    fn keystream(&mut self) -> Result<&mut IcmKeystream, SrtpError> {
        self.keystream.as_mut().ok_or(SrtpError::CipherFail)
    }
}

impl SrtpCipher for AesIcm {
    fn cipher_type(&self) -> CipherType {
        self.cipher_type
    }

    fn key_len(&self) -> usize {
        self.cipher_type.key_len_with_salt()
    }

    fn init(&mut self, key: &[u8]) -> Result<(), SrtpError> {
        let base = self.cipher_type.base_key_len();
        if key.len() < base + SALT_LEN {
            return Err(SrtpError::InitFail);
        }
        self.key = Zeroizing::new(key[..base].to_vec());
        self.salt = [0u8; 16];
        self.salt[..SALT_LEN].copy_from_slice(&key[base..base + SALT_LEN]);
        self.keystream = None;
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8], _direction: CipherDirection) -> Result<(), SrtpError> {
        if iv.len() != 16 || self.key.is_empty() {
            return Err(SrtpError::BadParam);
        }
        let mut counter = [0u8; 16];
        for (i, b) in counter.iter_mut().enumerate() {
            *b = iv[i] ^ self.salt[i];
        }
        self.keystream = Some(IcmKeystream::new(self.cipher_type, &self.key, &counter)?);
        Ok(())
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<(), SrtpError> {
        self.keystream()?.apply(buf);
        Ok(())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> Result<usize, SrtpError> {
        self.keystream()?.apply(buf);
        Ok(buf.len())
    }

    fn output(&mut self, out: &mut [u8]) -> Result<(), SrtpError> {
        out.fill(0);
        self.keystream()?.apply(out);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SrtpCipher> {
        let mut c = self.clone();
        c.keystream = None;
        Box::new(c)
    }
}

// RFC 3711 B.2 and RFC 6188 §7 keystream vectors, zero IV.
const SALT: &str = "f0f1f2f3f4f5f6f7f8f9fafbfcfd";
const KEY_128: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const OUT_128: &str = "e03ead0935c95e80e166b16dd92b4eb4d23513162b02d0f72a43a2fe4a5f97ab";
const KEY_192: &str = "eab234764e517b2d3d160d587d8c86219740f65f99b6bcf7";
const OUT_192: &str = "35096cba4610028dc1b57503804ce37c5de986291dcce161d5165ec4568f5c9a";
const KEY_256: &str = "57f82fe3613fd170a85ec93c40b1f0922ec4cb0dc025b58272147cc438944a98";
const OUT_256: &str = "92bdd28a93c3f52511c677d08b5515a49da71b2378a854f67050756ded165bac";

pub(crate) fn self_test(cipher_type: CipherType) -> Result<(), SrtpError> {
    let (key, expected) = match cipher_type {
        CipherType::AesIcm128 => (KEY_128, OUT_128),
        CipherType::AesIcm192 => (KEY_192, OUT_192),
        CipherType::AesIcm256 => (KEY_256, OUT_256),
        _ => return Err(SrtpError::BadParam),
    };
    let mut keying = unhex(key)?;
    keying.extend_from_slice(&unhex(SALT)?);
    let expected = unhex(expected)?;

    let mut c = AesIcm::new(cipher_type, keying.len())?;
    c.init(&keying)?;
    c.set_iv(&[0u8; 16], CipherDirection::Encrypt)?;
    let mut buf = vec![0u8; expected.len()];
    c.encrypt(&mut buf)?;
    if buf != expected {
        return Err(SrtpError::CipherFail);
    }

    c.set_iv(&[0u8; 16], CipherDirection::Decrypt)?;
    c.decrypt(&mut buf)?;
    if buf.iter().any(|&b| b != 0) {
        return Err(SrtpError::CipherFail);
    }
    Ok(())
}

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::{Aes128, Aes256};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce, Tag};
use ctr::Ctr32BE;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::srtp::cipher::{CipherDirection, CipherType, SrtpCipher, unhex};
use crate::srtp::constants::{GCM_TAG_LEN_8, GCM_TAG_LEN_16};
use crate::srtp::srtp_error::SrtpError;

const GCM_NONCE_LEN: usize = 12;

#[derive(Clone)]
enum GcmKey {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

impl GcmKey {
    fn seal(&self, nonce: &[u8; GCM_NONCE_LEN], aad: &[u8], buf: &mut [u8]) -> Result<Tag, SrtpError> {
        let nonce = Nonce::from_slice(nonce);
        match self {
            Self::Aes128(c) => c.encrypt_in_place_detached(nonce, aad, buf),
            Self::Aes256(c) => c.encrypt_in_place_detached(nonce, aad, buf),
        }
        .map_err(|_| SrtpError::CipherFail)
    }

    fn open(
        &self,
        nonce: &[u8; GCM_NONCE_LEN],
        aad: &[u8],
        buf: &mut [u8],
        tag: &[u8],
    ) -> Result<(), SrtpError> {
        let nonce = Nonce::from_slice(nonce);
        let tag = Tag::from_slice(tag);
        match self {
            Self::Aes128(c) => c.decrypt_in_place_detached(nonce, aad, buf, tag),
            Self::Aes256(c) => c.decrypt_in_place_detached(nonce, aad, buf, tag),
        }
        .map_err(|_| SrtpError::AuthFail)
    }
}

/// AES-GCM (RFC 7714) with a 16 or 8 byte tag.
///
/// Keyed with `key || 12-byte salt`; the salt is applied by the caller when
/// forming the nonce, so only the key part is used here. The `aes-gcm` crate
/// does not verify tags shorter than 12 bytes, so 8 byte tags are checked by
/// decrypting with the raw GCM counter stream and recomputing the full tag.
#[derive(Clone)]
pub struct AesGcm {
    cipher_type: CipherType,
    tag_len: usize,
    key: Option<GcmKey>,
    raw_key: Zeroizing<Vec<u8>>,
    nonce: Option<[u8; GCM_NONCE_LEN]>,
    aad: Vec<u8>,
    tag: [u8; GCM_TAG_LEN_16],
}

impl AesGcm {
    pub fn new(cipher_type: CipherType, key_len: usize, tag_len: usize) -> Result<Self, SrtpError> {
        if !cipher_type.is_aead()
            || key_len != cipher_type.key_len_with_salt()
            || (tag_len != GCM_TAG_LEN_8 && tag_len != GCM_TAG_LEN_16)
        {
            return Err(SrtpError::BadParam);
        }
        Ok(Self {
            cipher_type,
            tag_len,
            key: None,
            raw_key: Zeroizing::new(Vec::new()),
            nonce: None,
            aad: Vec::new(),
            tag: [0u8; GCM_TAG_LEN_16],
        })
    }

    fn parts(&self) -> Result<(&GcmKey, [u8; GCM_NONCE_LEN]), SrtpError> {
        match (&self.key, self.nonce) {
            (Some(k), Some(n)) => Ok((k, n)),
            _ => Err(SrtpError::CipherFail),
        }
    }

    /// Applies the GCM payload keystream (counter starting at 2).
    fn ctr_keystream(&self, nonce: &[u8; GCM_NONCE_LEN], buf: &mut [u8]) -> Result<(), SrtpError> {
        let mut block = [0u8; 16];
        block[..GCM_NONCE_LEN].copy_from_slice(nonce);
        block[15] = 2;
        match self.cipher_type {
            CipherType::AesGcm128 => Ctr32BE::<Aes128>::new_from_slices(&self.raw_key, &block)
                .map_err(|_| SrtpError::CipherFail)?
                .apply_keystream(buf),
            CipherType::AesGcm256 => Ctr32BE::<Aes256>::new_from_slices(&self.raw_key, &block)
                .map_err(|_| SrtpError::CipherFail)?
                .apply_keystream(buf),
            _ => return Err(SrtpError::CipherFail),
        }
        Ok(())
    }

    fn open_short_tag(
        &self,
        key: &GcmKey,
        nonce: &[u8; GCM_NONCE_LEN],
        ct: &mut [u8],
        tag: &[u8],
    ) -> Result<(), SrtpError> {
        let mut plaintext = Zeroizing::new(ct.to_vec());
        self.ctr_keystream(nonce, &mut plaintext)?;

        let mut scratch = Zeroizing::new(plaintext.to_vec());
        let full = key.seal(nonce, &self.aad, &mut scratch)?;
        if full[..tag.len()].ct_eq(tag).unwrap_u8() != 1 {
            return Err(SrtpError::AuthFail);
        }
        ct.copy_from_slice(&plaintext);
        Ok(())
    }
}

impl SrtpCipher for AesGcm {
    fn cipher_type(&self) -> CipherType {
        self.cipher_type
    }

    fn key_len(&self) -> usize {
        self.cipher_type.key_len_with_salt()
    }

    fn tag_len(&self) -> usize {
        self.tag_len
    }

    fn init(&mut self, key: &[u8]) -> Result<(), SrtpError> {
        let base = self.cipher_type.base_key_len();
        if key.len() < base {
            return Err(SrtpError::InitFail);
        }
        let k = &key[..base];
        self.key = Some(match self.cipher_type {
            CipherType::AesGcm128 => {
                GcmKey::Aes128(Aes128Gcm::new_from_slice(k).map_err(|_| SrtpError::InitFail)?)
            }
            _ => GcmKey::Aes256(Aes256Gcm::new_from_slice(k).map_err(|_| SrtpError::InitFail)?),
        });
        self.raw_key = Zeroizing::new(k.to_vec());
        self.nonce = None;
        self.aad.clear();
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8], _direction: CipherDirection) -> Result<(), SrtpError> {
        let nonce: [u8; GCM_NONCE_LEN] = iv.try_into().map_err(|_| SrtpError::BadParam)?;
        self.nonce = Some(nonce);
        self.aad.clear();
        Ok(())
    }

    fn set_aad(&mut self, aad: &[u8]) -> Result<(), SrtpError> {
        self.aad.extend_from_slice(aad);
        Ok(())
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<(), SrtpError> {
        let (key, nonce) = self.parts()?;
        let tag = key.seal(&nonce, &self.aad, buf)?;
        self.tag.copy_from_slice(&tag);
        self.aad.clear();
        Ok(())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> Result<usize, SrtpError> {
        if buf.len() < self.tag_len {
            return Err(SrtpError::CipherFail);
        }
        let ct_len = buf.len() - self.tag_len;
        let (ct, tag) = buf.split_at_mut(ct_len);
        let (key, nonce) = self.parts()?;
        let res = if self.tag_len == GCM_TAG_LEN_16 {
            key.open(&nonce, &self.aad, ct, tag)
        } else {
            self.open_short_tag(key, &nonce, ct, tag)
        };
        self.aad.clear();
        res.map(|_| ct_len)
    }

    fn get_tag(&mut self, out: &mut [u8]) -> Result<usize, SrtpError> {
        if out.len() < self.tag_len {
            return Err(SrtpError::BadParam);
        }
        out[..self.tag_len].copy_from_slice(&self.tag[..self.tag_len]);
        Ok(self.tag_len)
    }

    fn box_clone(&self) -> Box<dyn SrtpCipher> {
        let mut c = self.clone();
        c.nonce = None;
        c.aad.clear();
        Box::new(c)
    }
}

// McGrew & Viega GCM test case 4 (and its AES-256 counterpart), with the
// 12 byte salt the SRTP keying material carries.
const SALT: &str = "0102030405060708090a0b0c";
const NONCE: &str = "cafebabefacedbaddecaf888";
const AAD: &str = "feedfacedeadbeeffeedfacedeadbeefabaddad2";
const PLAINTEXT: &str = "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a72\
1c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b39";
const KEY_128: &str = "feffe9928665731c6d6a8f9467308308";
const CT_128: &str = "42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e\
21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e091\
5bc94fbc3221a5db94fae95ae7121a47";
const KEY_256: &str = "feffe9928665731ca55909c55466931caff5269a21d514b26d6a8f9467308308";
const CT_256: &str = "0b11cfaf684dae46c790b88eb76a762a9482caab3e39d7861bc793ed757f235a\
dafdd3e20e8087a96dd7e26a7d5fb480efefc52912d1aa1009c986c1\
45bc03e6e1ac0a9f81cb8e5b4665631d";

fn run_vector(cipher_type: CipherType, key: &str, expected: &str, tag_len: usize) -> Result<(), SrtpError> {
    let mut keying = unhex(key)?;
    keying.extend_from_slice(&unhex(SALT)?);
    let nonce = unhex(NONCE)?;
    let aad = unhex(AAD)?;
    let plaintext = unhex(PLAINTEXT)?;
    let full = unhex(expected)?;
    let expected = &full[..plaintext.len() + tag_len];

    let mut c = AesGcm::new(cipher_type, keying.len(), tag_len)?;
    c.init(&keying)?;

    c.set_iv(&nonce, CipherDirection::Encrypt)?;
    c.set_aad(&aad)?;
    let mut buf = plaintext.clone();
    c.encrypt(&mut buf)?;
    let mut tag = [0u8; GCM_TAG_LEN_16];
    let n = c.get_tag(&mut tag)?;
    buf.extend_from_slice(&tag[..n]);
    if buf != expected {
        return Err(SrtpError::CipherFail);
    }

    c.set_iv(&nonce, CipherDirection::Decrypt)?;
    c.set_aad(&aad)?;
    let len = c.decrypt(&mut buf)?;
    if buf[..len] != plaintext[..] {
        return Err(SrtpError::CipherFail);
    }
    Ok(())
}

pub(crate) fn self_test(cipher_type: CipherType) -> Result<(), SrtpError> {
    let (key, ct) = match cipher_type {
        CipherType::AesGcm128 => (KEY_128, CT_128),
        CipherType::AesGcm256 => (KEY_256, CT_256),
        _ => return Err(SrtpError::BadParam),
    };
    run_vector(cipher_type, key, ct, GCM_TAG_LEN_16)?;
    run_vector(cipher_type, key, ct, GCM_TAG_LEN_8)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn keyed(tag_len: usize) -> AesGcm {
        let mut keying = unhex(KEY_128).unwrap();
        keying.extend_from_slice(&unhex(SALT).unwrap());
        let mut c = AesGcm::new(CipherType::AesGcm128, 28, tag_len).unwrap();
        c.init(&keying).unwrap();
        c
    }

    fn sealed(c: &mut AesGcm, aad: &[u8], pt: &[u8]) -> Vec<u8> {
        c.set_iv(&[7u8; 12], CipherDirection::Encrypt).unwrap();
        c.set_aad(aad).unwrap();
        let mut buf = pt.to_vec();
        c.encrypt(&mut buf).unwrap();
        let mut tag = [0u8; 16];
        let n = c.get_tag(&mut tag).unwrap();
        buf.extend_from_slice(&tag[..n]);
        buf
    }

    #[test]
    fn short_tag_detects_tampering() {
        let mut c = keyed(GCM_TAG_LEN_8);
        let mut buf = sealed(&mut c, b"hdr", b"payload bytes");
        assert_eq!(buf.len(), 13 + 8);

        buf[2] ^= 0x01;
        c.set_iv(&[7u8; 12], CipherDirection::Decrypt).unwrap();
        c.set_aad(b"hdr").unwrap();
        assert_eq!(c.decrypt(&mut buf), Err(SrtpError::AuthFail));
    }

    #[test]
    fn aad_is_authenticated() {
        let mut c = keyed(GCM_TAG_LEN_16);
        let mut buf = sealed(&mut c, b"hdr", b"payload");
        c.set_iv(&[7u8; 12], CipherDirection::Decrypt).unwrap();
        c.set_aad(b"hdX").unwrap();
        assert_eq!(c.decrypt(&mut buf), Err(SrtpError::AuthFail));
    }

    #[test]
    fn empty_payload_still_produces_a_tag() {
        let mut c = keyed(GCM_TAG_LEN_16);
        let mut buf = sealed(&mut c, b"only aad", b"");
        assert_eq!(buf.len(), 16);
        c.set_iv(&[7u8; 12], CipherDirection::Decrypt).unwrap();
        c.set_aad(b"only aad").unwrap();
        assert_eq!(c.decrypt(&mut buf).unwrap(), 0);
    }

    #[test]
    fn aad_accumulates_across_calls() {
        let mut c = keyed(GCM_TAG_LEN_16);
        let whole = sealed(&mut c, b"abcdef", b"x");
        c.set_iv(&[7u8; 12], CipherDirection::Encrypt).unwrap();
        c.set_aad(b"abc").unwrap();
        c.set_aad(b"def").unwrap();
        let mut buf = b"x".to_vec();
        c.encrypt(&mut buf).unwrap();
        let mut tag = [0u8; 16];
        c.get_tag(&mut tag).unwrap();
        buf.extend_from_slice(&tag);
        assert_eq!(buf, whole);
    }

    #[test]
    fn rejects_unsupported_tag_length() {
        assert!(AesGcm::new(CipherType::AesGcm128, 28, 12).is_err());
    }
}

use byteorder::{BigEndian, ByteOrder};
use subtle::ConstantTimeEq;

use crate::srtp::cipher::CipherType;

/// Tag comparison that does not leak where the first mismatch is.
pub(super) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).unwrap_u8() == 1
}

/// Per-packet IV for RTP under a non-AEAD cipher. Counter mode gets
/// `0 || SSRC || index << 16` (the cipher XORs in the salt); other ciphers
/// just see the index.
pub(super) fn rtp_iv(cipher_type: CipherType, ssrc: u32, index: u64) -> [u8; 16] {
    let mut iv = [0u8; 16];
    if is_counter_mode(cipher_type) {
        BigEndian::write_u32(&mut iv[4..8], ssrc);
        BigEndian::write_u64(&mut iv[8..16], index << 16);
    } else {
        BigEndian::write_u64(&mut iv[8..16], index);
    }
    iv
}

/// Same construction for the 31-bit SRTCP index.
pub(super) fn rtcp_iv(cipher_type: CipherType, ssrc: u32, index: u32) -> [u8; 16] {
    let mut iv = [0u8; 16];
    if is_counter_mode(cipher_type) {
        BigEndian::write_u32(&mut iv[4..8], ssrc);
        BigEndian::write_u64(&mut iv[8..16], u64::from(index) << 16);
    } else {
        BigEndian::write_u32(&mut iv[12..16], index);
    }
    iv
}

/// RFC 7714 §8.1: `00 00 || SSRC || ROC || SEQ` XOR salt.
pub(super) fn rtp_aead_iv(salt: &[u8], ssrc: u32, index: u64) -> [u8; 12] {
    let mut iv = [0u8; 12];
    BigEndian::write_u32(&mut iv[2..6], ssrc);
    BigEndian::write_u32(&mut iv[6..10], (index >> 16) as u32);
    BigEndian::write_u16(&mut iv[10..12], index as u16);
    xor_salt(&mut iv, salt);
    iv
}

/// RFC 7714 §9.1: `00 00 || SSRC || 00 00 || 0 || SRTCP index` XOR salt.
pub(super) fn rtcp_aead_iv(salt: &[u8], ssrc: u32, index: u32) -> [u8; 12] {
    let mut iv = [0u8; 12];
    BigEndian::write_u32(&mut iv[2..6], ssrc);
    BigEndian::write_u32(&mut iv[8..12], index);
    xor_salt(&mut iv, salt);
    iv
}

fn xor_salt(iv: &mut [u8; 12], salt: &[u8]) {
    for (b, s) in iv.iter_mut().zip(salt) {
        *b ^= s;
    }
}

fn is_counter_mode(cipher_type: CipherType) -> bool {
    matches!(
        cipher_type,
        CipherType::AesIcm128 | CipherType::AesIcm192 | CipherType::AesIcm256
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn counter_mode_iv_layout() {
        let iv = rtp_iv(CipherType::AesIcm128, 0xcafebabe, 0x0001_1234);
        assert_eq!(
            iv,
            [0, 0, 0, 0, 0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 1, 0x12, 0x34, 0, 0]
        );
        let iv = rtp_iv(CipherType::Null, 1, 0x0001_1234);
        assert_eq!(&iv[8..], &[0, 0, 0, 0, 0, 1, 0x12, 0x34]);
    }

    #[test]
    fn rtcp_counter_mode_iv_layout() {
        let iv = rtcp_iv(CipherType::AesIcm256, 0x01020304, 0x0005_0001);
        assert_eq!(&iv[4..8], &[1, 2, 3, 4]);
        assert_eq!(&iv[8..16], &[0, 0, 0, 5, 0, 1, 0, 0]);
        let iv = rtcp_iv(CipherType::Null, 1, 7);
        assert_eq!(&iv[..12], &[0u8; 12]);
        assert_eq!(&iv[12..], &[0, 0, 0, 7]);
    }

    #[test]
    fn aead_ivs_follow_rfc7714() {
        let salt = [0u8; 12];
        let iv = rtp_aead_iv(&salt, 0x11223344, 0x0000_0002_abcd);
        assert_eq!(iv, [0, 0, 0x11, 0x22, 0x33, 0x44, 0, 0, 0, 2, 0xab, 0xcd]);

        let salt = [0xffu8; 12];
        let iv = rtcp_aead_iv(&salt, 0, 1);
        assert_eq!(iv[11], 0xfe);
        assert_eq!(iv[0], 0xff);
    }

    #[test]
    fn constant_time_eq_checks_length() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"ab", b"abc"));
    }
}

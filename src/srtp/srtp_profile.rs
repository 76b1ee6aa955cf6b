use crate::srtp::constants::{
    AEAD_SALT_LEN, AES_128_KEY_LEN, AES_256_KEY_LEN, SALT_LEN,
};
use crate::srtp::crypto_policy::CryptoPolicy;
use crate::srtp::srtp_error::SrtpError;

/// DTLS-SRTP protection profiles (RFC 5764, RFC 7714).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrtpProfile {
    Aes128CmHmacSha1_80,
    Aes128CmHmacSha1_32,
    NullHmacSha1_80,
    NullHmacSha1_32,
    AeadAes128Gcm,
    AeadAes256Gcm,
}

impl SrtpProfile {
    /// Maps the name OpenSSL reports for the negotiated profile.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SRTP_AES128_CM_SHA1_80" => Some(SrtpProfile::Aes128CmHmacSha1_80),
            "SRTP_AES128_CM_SHA1_32" => Some(SrtpProfile::Aes128CmHmacSha1_32),
            "SRTP_NULL_SHA1_80" => Some(SrtpProfile::NullHmacSha1_80),
            "SRTP_NULL_SHA1_32" => Some(SrtpProfile::NullHmacSha1_32),
            "SRTP_AEAD_AES_128_GCM" => Some(SrtpProfile::AeadAes128Gcm),
            "SRTP_AEAD_AES_256_GCM" => Some(SrtpProfile::AeadAes256Gcm),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SrtpProfile::Aes128CmHmacSha1_80 => "SRTP_AES128_CM_SHA1_80",
            SrtpProfile::Aes128CmHmacSha1_32 => "SRTP_AES128_CM_SHA1_32",
            SrtpProfile::NullHmacSha1_80 => "SRTP_NULL_SHA1_80",
            SrtpProfile::NullHmacSha1_32 => "SRTP_NULL_SHA1_32",
            SrtpProfile::AeadAes128Gcm => "SRTP_AEAD_AES_128_GCM",
            SrtpProfile::AeadAes256Gcm => "SRTP_AEAD_AES_256_GCM",
        }
    }

    pub fn master_key_len(self) -> usize {
        match self {
            SrtpProfile::AeadAes256Gcm => AES_256_KEY_LEN,
            _ => AES_128_KEY_LEN,
        }
    }

    pub fn master_salt_len(self) -> usize {
        match self {
            SrtpProfile::AeadAes128Gcm | SrtpProfile::AeadAes256Gcm => AEAD_SALT_LEN,
            _ => SALT_LEN,
        }
    }

    pub fn rtp_policy(self) -> Result<CryptoPolicy, SrtpError> {
        match self {
            SrtpProfile::Aes128CmHmacSha1_80 => Ok(CryptoPolicy::aes_cm_128_hmac_sha1_80()),
            SrtpProfile::Aes128CmHmacSha1_32 => Ok(CryptoPolicy::aes_cm_128_hmac_sha1_32()),
            SrtpProfile::NullHmacSha1_80 => Ok(CryptoPolicy::null_cipher_hmac_sha1_80()),
            SrtpProfile::AeadAes128Gcm => Ok(CryptoPolicy::aes_gcm_128_16_auth()),
            SrtpProfile::AeadAes256Gcm => Ok(CryptoPolicy::aes_gcm_256_16_auth()),
            SrtpProfile::NullHmacSha1_32 => Err(SrtpError::BadParam),
        }
    }

    /// RTCP keeps the 80-bit tag even under the 32-bit profile (RFC 3711 §5.2).
    pub fn rtcp_policy(self) -> Result<CryptoPolicy, SrtpError> {
        match self {
            SrtpProfile::Aes128CmHmacSha1_32 => Ok(CryptoPolicy::aes_cm_128_hmac_sha1_80()),
            other => other.rtp_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::srtp::crypto_policy::SecurityServices;

    #[test]
    fn names_round_trip() {
        for p in [
            SrtpProfile::Aes128CmHmacSha1_80,
            SrtpProfile::Aes128CmHmacSha1_32,
            SrtpProfile::NullHmacSha1_80,
            SrtpProfile::NullHmacSha1_32,
            SrtpProfile::AeadAes128Gcm,
            SrtpProfile::AeadAes256Gcm,
        ] {
            assert_eq!(SrtpProfile::from_name(p.name()), Some(p));
        }
        assert_eq!(SrtpProfile::from_name("SRTP_AES256_CM_SHA1_80"), None);
    }

    #[test]
    fn short_tag_profile_keeps_long_rtcp_tag() {
        let p = SrtpProfile::Aes128CmHmacSha1_32;
        assert_eq!(p.rtp_policy().unwrap().auth_tag_len, 4);
        assert_eq!(p.rtcp_policy().unwrap().auth_tag_len, 10);
    }

    #[test]
    fn key_and_salt_sizes() {
        assert_eq!(SrtpProfile::Aes128CmHmacSha1_80.master_key_len(), 16);
        assert_eq!(SrtpProfile::Aes128CmHmacSha1_80.master_salt_len(), 14);
        assert_eq!(SrtpProfile::AeadAes256Gcm.master_key_len(), 32);
        assert_eq!(SrtpProfile::AeadAes128Gcm.master_salt_len(), 12);
    }

    #[test]
    fn null_profiles() {
        let p = SrtpProfile::NullHmacSha1_80.rtp_policy().unwrap();
        assert_eq!(p.sec_serv, SecurityServices::Auth);
        assert_eq!(
            SrtpProfile::NullHmacSha1_32.rtp_policy(),
            Err(SrtpError::BadParam)
        );
        assert_eq!(
            SrtpProfile::NullHmacSha1_32.rtcp_policy(),
            Err(SrtpError::BadParam)
        );
    }
}

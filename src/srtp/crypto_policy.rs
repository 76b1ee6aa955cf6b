use crate::srtp::auth::AuthType;
use crate::srtp::cipher::CipherType;
use crate::srtp::constants::{
    AES_GCM_128_KEY_LEN_WSALT, AES_GCM_256_KEY_LEN_WSALT, AES_ICM_128_KEY_LEN_WSALT,
    AES_ICM_192_KEY_LEN_WSALT, AES_ICM_256_KEY_LEN_WSALT, AUTH_TAG_LEN_32, AUTH_TAG_LEN_80,
    GCM_TAG_LEN_8, GCM_TAG_LEN_16, HMAC_SHA1_KEY_LEN,
};

/// Which protections a stream applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityServices {
    None,
    Conf,
    Auth,
    ConfAndAuth,
}

impl SecurityServices {
    pub fn confidentiality(self) -> bool {
        matches!(self, SecurityServices::Conf | SecurityServices::ConfAndAuth)
    }

    pub fn authentication(self) -> bool {
        matches!(self, SecurityServices::Auth | SecurityServices::ConfAndAuth)
    }
}

/// Cipher and MAC selection for one direction of traffic (RTP or RTCP).
///
/// `cipher_key_len` includes the salt. For GCM the MAC is `Null` and
/// `auth_tag_len` carries the GCM tag length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoPolicy {
    pub cipher_type: CipherType,
    pub cipher_key_len: usize,
    pub auth_type: AuthType,
    pub auth_key_len: usize,
    pub auth_tag_len: usize,
    pub sec_serv: SecurityServices,
}

impl Default for CryptoPolicy {
    fn default() -> Self {
        Self::rtp_default()
    }
}

impl CryptoPolicy {
    const fn icm(cipher_type: CipherType, key_len: usize, tag_len: usize) -> Self {
        let (auth_type, auth_key_len, sec_serv) = if tag_len == 0 {
            (AuthType::Null, 0, SecurityServices::Conf)
        } else {
            (AuthType::HmacSha1, HMAC_SHA1_KEY_LEN, SecurityServices::ConfAndAuth)
        };
        Self {
            cipher_type,
            cipher_key_len: key_len,
            auth_type,
            auth_key_len,
            auth_tag_len: tag_len,
            sec_serv,
        }
    }

    const fn gcm(cipher_type: CipherType, key_len: usize, tag_len: usize, sec_serv: SecurityServices) -> Self {
        Self {
            cipher_type,
            cipher_key_len: key_len,
            auth_type: AuthType::Null,
            auth_key_len: 0,
            auth_tag_len: tag_len,
            sec_serv,
        }
    }

    /// AES-CM-128 with an 80-bit HMAC-SHA1 tag (RFC 3711 default).
    pub const fn rtp_default() -> Self {
        Self::aes_cm_128_hmac_sha1_80()
    }

    pub const fn rtcp_default() -> Self {
        Self::aes_cm_128_hmac_sha1_80()
    }

    pub const fn aes_cm_128_hmac_sha1_80() -> Self {
        Self::icm(CipherType::AesIcm128, AES_ICM_128_KEY_LEN_WSALT, AUTH_TAG_LEN_80)
    }

    /// Only meant for RTP; RFC 4568 keeps RTCP at 80 bits.
    pub const fn aes_cm_128_hmac_sha1_32() -> Self {
        Self::icm(CipherType::AesIcm128, AES_ICM_128_KEY_LEN_WSALT, AUTH_TAG_LEN_32)
    }

    pub const fn aes_cm_128_null_auth() -> Self {
        Self::icm(CipherType::AesIcm128, AES_ICM_128_KEY_LEN_WSALT, 0)
    }

    pub const fn aes_cm_192_hmac_sha1_80() -> Self {
        Self::icm(CipherType::AesIcm192, AES_ICM_192_KEY_LEN_WSALT, AUTH_TAG_LEN_80)
    }

    pub const fn aes_cm_192_hmac_sha1_32() -> Self {
        Self::icm(CipherType::AesIcm192, AES_ICM_192_KEY_LEN_WSALT, AUTH_TAG_LEN_32)
    }

    pub const fn aes_cm_192_null_auth() -> Self {
        Self::icm(CipherType::AesIcm192, AES_ICM_192_KEY_LEN_WSALT, 0)
    }

    pub const fn aes_cm_256_hmac_sha1_80() -> Self {
        Self::icm(CipherType::AesIcm256, AES_ICM_256_KEY_LEN_WSALT, AUTH_TAG_LEN_80)
    }

    pub const fn aes_cm_256_hmac_sha1_32() -> Self {
        Self::icm(CipherType::AesIcm256, AES_ICM_256_KEY_LEN_WSALT, AUTH_TAG_LEN_32)
    }

    pub const fn aes_cm_256_null_auth() -> Self {
        Self::icm(CipherType::AesIcm256, AES_ICM_256_KEY_LEN_WSALT, 0)
    }

    pub const fn null_cipher_hmac_sha1_80() -> Self {
        Self {
            cipher_type: CipherType::Null,
            cipher_key_len: 0,
            auth_type: AuthType::HmacSha1,
            auth_key_len: HMAC_SHA1_KEY_LEN,
            auth_tag_len: AUTH_TAG_LEN_80,
            sec_serv: SecurityServices::Auth,
        }
    }

    /// No protection at all. Testing only.
    pub const fn null_cipher_hmac_null() -> Self {
        Self {
            cipher_type: CipherType::Null,
            cipher_key_len: 0,
            auth_type: AuthType::Null,
            auth_key_len: 0,
            auth_tag_len: 0,
            sec_serv: SecurityServices::None,
        }
    }

    pub const fn aes_gcm_128_8_auth() -> Self {
        Self::gcm(CipherType::AesGcm128, AES_GCM_128_KEY_LEN_WSALT, GCM_TAG_LEN_8, SecurityServices::ConfAndAuth)
    }

    pub const fn aes_gcm_256_8_auth() -> Self {
        Self::gcm(CipherType::AesGcm256, AES_GCM_256_KEY_LEN_WSALT, GCM_TAG_LEN_8, SecurityServices::ConfAndAuth)
    }

    /// Authentication without encryption; meant for SRTCP.
    pub const fn aes_gcm_128_8_only_auth() -> Self {
        Self::gcm(CipherType::AesGcm128, AES_GCM_128_KEY_LEN_WSALT, GCM_TAG_LEN_8, SecurityServices::Auth)
    }

    pub const fn aes_gcm_256_8_only_auth() -> Self {
        Self::gcm(CipherType::AesGcm256, AES_GCM_256_KEY_LEN_WSALT, GCM_TAG_LEN_8, SecurityServices::Auth)
    }

    pub const fn aes_gcm_128_16_auth() -> Self {
        Self::gcm(CipherType::AesGcm128, AES_GCM_128_KEY_LEN_WSALT, GCM_TAG_LEN_16, SecurityServices::ConfAndAuth)
    }

    pub const fn aes_gcm_256_16_auth() -> Self {
        Self::gcm(CipherType::AesGcm256, AES_GCM_256_KEY_LEN_WSALT, GCM_TAG_LEN_16, SecurityServices::ConfAndAuth)
    }

    /// Looks up a preset by its function name, e.g. `aes_cm_128_hmac_sha1_80`.
    pub fn from_name(name: &str) -> Option<Self> {
        let p = match name {
            "rtp_default" | "rtcp_default" | "aes_cm_128_hmac_sha1_80" => Self::aes_cm_128_hmac_sha1_80(),
            "aes_cm_128_hmac_sha1_32" => Self::aes_cm_128_hmac_sha1_32(),
            "aes_cm_128_null_auth" => Self::aes_cm_128_null_auth(),
            "aes_cm_192_hmac_sha1_80" => Self::aes_cm_192_hmac_sha1_80(),
            "aes_cm_192_hmac_sha1_32" => Self::aes_cm_192_hmac_sha1_32(),
            "aes_cm_192_null_auth" => Self::aes_cm_192_null_auth(),
            "aes_cm_256_hmac_sha1_80" => Self::aes_cm_256_hmac_sha1_80(),
            "aes_cm_256_hmac_sha1_32" => Self::aes_cm_256_hmac_sha1_32(),
            "aes_cm_256_null_auth" => Self::aes_cm_256_null_auth(),
            "null_cipher_hmac_sha1_80" => Self::null_cipher_hmac_sha1_80(),
            "null_cipher_hmac_null" => Self::null_cipher_hmac_null(),
            "aes_gcm_128_8_auth" => Self::aes_gcm_128_8_auth(),
            "aes_gcm_256_8_auth" => Self::aes_gcm_256_8_auth(),
            "aes_gcm_128_8_only_auth" => Self::aes_gcm_128_8_only_auth(),
            "aes_gcm_256_8_only_auth" => Self::aes_gcm_256_8_only_auth(),
            "aes_gcm_128_16_auth" => Self::aes_gcm_128_16_auth(),
            "aes_gcm_256_16_auth" => Self::aes_gcm_256_16_auth(),
            _ => return None,
        };
        Some(p)
    }

    /// Bytes of master key (without salt) the KDF consumes.
    pub fn master_key_len(&self) -> usize {
        self.cipher_key_len.saturating_sub(self.cipher_type.salt_len())
    }
}

use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::srtp::auth::{SrtpAuth, new_auth};
use crate::srtp::cipher::{SrtpCipher, new_cipher};
use crate::srtp::constants::{
    AEAD_SALT_LEN, MAX_KEY_LEN, SALT_LEN, SRTP_LABEL_RTCP_AUTH, SRTP_LABEL_RTCP_ENCRYPTION,
    SRTP_LABEL_RTCP_SALT, SRTP_LABEL_RTP_AUTH, SRTP_LABEL_RTP_ENCRYPTION,
    SRTP_LABEL_RTP_HEADER_ENCRYPTION, SRTP_LABEL_RTP_HEADER_SALT, SRTP_LABEL_RTP_SALT,
};
use crate::srtp::crypto_policy::CryptoPolicy;
use crate::srtp::kdf::Kdf;
use crate::srtp::key_limit::KeyLimit;
use crate::srtp::master_key::MasterKey;
use crate::srtp::policy::Policy;
use crate::srtp::srtp_error::SrtpError;

/// Keyed primitives derived from one master key.
///
/// Salts are zero-padded to 14 bytes whatever the cipher. Cloning gives the
/// clone its own primitive instances but shares the usage limit.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    #[zeroize(skip)]
    pub(crate) rtp_cipher: Box<dyn SrtpCipher>,
    #[zeroize(skip)]
    pub(crate) rtp_xtn_hdr_cipher: Option<Box<dyn SrtpCipher>>,
    #[zeroize(skip)]
    pub(crate) rtp_auth: Box<dyn SrtpAuth>,
    #[zeroize(skip)]
    pub(crate) rtcp_cipher: Box<dyn SrtpCipher>,
    #[zeroize(skip)]
    pub(crate) rtcp_auth: Box<dyn SrtpAuth>,
    pub(crate) salt: [u8; SALT_LEN],
    pub(crate) c_salt: [u8; SALT_LEN],
    pub(crate) mki_id: Vec<u8>,
    #[zeroize(skip)]
    pub(crate) limit: Arc<KeyLimit>,
}

impl SessionKeys {
    /// Allocates the primitives named by `policy` and keys them from
    /// `master` (RFC 3711 §4.3, RFC 6904 §4.3 for header extensions).
    pub fn new(policy: &Policy, master: &MasterKey) -> Result<Self, SrtpError> {
        let rtp = &policy.rtp;
        let rtcp = &policy.rtcp;

        let mut rtp_cipher = new_cipher(rtp.cipher_type, rtp.cipher_key_len, rtp.auth_tag_len)?;
        let mut rtp_auth = new_auth(rtp.auth_type, rtp.auth_key_len, rtp.auth_tag_len)?;
        let mut rtcp_cipher = new_cipher(rtcp.cipher_type, rtcp.cipher_key_len, rtcp.auth_tag_len)?;
        let mut rtcp_auth = new_auth(rtcp.auth_type, rtcp.auth_key_len, rtcp.auth_tag_len)?;
        let mut rtp_xtn_hdr_cipher = if policy.enc_xtn_hdr.is_empty() {
            None
        } else {
            let xtn_type = rtp.cipher_type.header_extension_cipher();
            let key_len = if xtn_type == rtp.cipher_type {
                rtp.cipher_key_len
            } else {
                xtn_type.key_len_with_salt()
            };
            Some(new_cipher(xtn_type, key_len, 0)?)
        };

        let base = rtp.master_key_len();
        let salt_len = rtp.cipher_type.salt_len();
        let key = master.key();
        if key.len() < base + salt_len {
            return Err(SrtpError::BadParam);
        }
        let mut kdf = Kdf::new(&key[..base], &key[base..base + salt_len])?;

        let mut salt = [0u8; SALT_LEN];
        let mut c_salt = [0u8; SALT_LEN];
        let mut tmp = Zeroizing::new([0u8; MAX_KEY_LEN + SALT_LEN]);

        derive_cipher_key(
            &mut kdf,
            rtp,
            SRTP_LABEL_RTP_ENCRYPTION,
            SRTP_LABEL_RTP_SALT,
            rtp_cipher.as_mut(),
            &mut tmp,
            &mut salt,
        )?;

        if let Some(xtn) = rtp_xtn_hdr_cipher.as_mut() {
            let xtn_type = xtn.cipher_type();
            let xtn_base = xtn_type.base_key_len();
            // GCM salts are 12 bytes; the counter-mode header cipher gets
            // them zero-extended.
            let xtn_salt_len = if xtn_type == rtp.cipher_type {
                salt_len
            } else {
                xtn_type.salt_len().min(salt_len)
            };
            tmp.fill(0);
            kdf.generate(SRTP_LABEL_RTP_HEADER_ENCRYPTION, &mut tmp[..xtn_base])?;
            kdf.generate(
                SRTP_LABEL_RTP_HEADER_SALT,
                &mut tmp[xtn_base..xtn_base + xtn_salt_len],
            )?;
            xtn.init(&tmp[..xtn_base + xtn_type.salt_len()])
                .map_err(|_| SrtpError::InitFail)?;
        }

        derive_auth_key(&mut kdf, SRTP_LABEL_RTP_AUTH, rtp_auth.as_mut(), &mut tmp)?;

        derive_cipher_key(
            &mut kdf,
            rtcp,
            SRTP_LABEL_RTCP_ENCRYPTION,
            SRTP_LABEL_RTCP_SALT,
            rtcp_cipher.as_mut(),
            &mut tmp,
            &mut c_salt,
        )?;

        derive_auth_key(&mut kdf, SRTP_LABEL_RTCP_AUTH, rtcp_auth.as_mut(), &mut tmp)?;

        Ok(Self {
            rtp_cipher,
            rtp_xtn_hdr_cipher,
            rtp_auth,
            rtcp_cipher,
            rtcp_auth,
            salt,
            c_salt,
            mki_id: master.mki_id().to_vec(),
            limit: Arc::new(KeyLimit::new(policy.key_limit, policy.key_soft_limit)),
        })
    }

    pub fn mki_id(&self) -> &[u8] {
        &self.mki_id
    }

    pub fn mki_size(&self) -> usize {
        self.mki_id.len()
    }

    pub fn limit(&self) -> &Arc<KeyLimit> {
        &self.limit
    }

    /// First 12 bytes of the RTP salt, as RFC 7714 uses it.
    pub(crate) fn aead_salt(&self) -> &[u8] {
        &self.salt[..AEAD_SALT_LEN]
    }

    pub(crate) fn aead_c_salt(&self) -> &[u8] {
        &self.c_salt[..AEAD_SALT_LEN]
    }

    pub(crate) fn rtp_is_aead(&self) -> bool {
        self.rtp_cipher.cipher_type().is_aead()
    }

    pub(crate) fn rtcp_is_aead(&self) -> bool {
        self.rtcp_cipher.cipher_type().is_aead()
    }
}

fn derive_cipher_key(
    kdf: &mut Kdf,
    policy: &CryptoPolicy,
    key_label: u8,
    salt_label: u8,
    cipher: &mut dyn SrtpCipher,
    tmp: &mut [u8; MAX_KEY_LEN + SALT_LEN],
    salt_out: &mut [u8; SALT_LEN],
) -> Result<(), SrtpError> {
    let base = policy.master_key_len();
    let salt_len = policy.cipher_type.salt_len();
    tmp.fill(0);
    kdf.generate(key_label, &mut tmp[..base])?;
    if salt_len > 0 {
        kdf.generate(salt_label, &mut tmp[base..base + salt_len])?;
        salt_out[..salt_len].copy_from_slice(&tmp[base..base + salt_len]);
    }
    cipher
        .init(&tmp[..base + salt_len])
        .map_err(|_| SrtpError::InitFail)
}

fn derive_auth_key(
    kdf: &mut Kdf,
    label: u8,
    auth: &mut dyn SrtpAuth,
    tmp: &mut [u8; MAX_KEY_LEN + SALT_LEN],
) -> Result<(), SrtpError> {
    let len = auth.key_len();
    if len > tmp.len() {
        return Err(SrtpError::BadParam);
    }
    tmp.fill(0);
    kdf.generate(label, &mut tmp[..len])?;
    auth.init(&tmp[..len]).map_err(|_| SrtpError::InitFail)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::srtp::cipher::CipherType;
    use crate::srtp::policy::Ssrc;

    fn policy(rtp: CryptoPolicy, key_len: usize) -> Policy {
        Policy::new(
            Ssrc::specific(1),
            rtp,
            rtp,
            MasterKey::with_mki(vec![0x42u8; key_len], vec![0xaa, 0xbb]),
        )
    }

    #[test]
    fn icm_keys_carry_full_salts() {
        let p = policy(CryptoPolicy::rtp_default(), 30);
        let keys = SessionKeys::new(&p, &p.keys[0]).unwrap();
        assert_ne!(keys.salt, [0u8; SALT_LEN]);
        assert_ne!(keys.c_salt, keys.salt);
        assert_eq!(keys.mki_id(), &[0xaa, 0xbb]);
        assert!(keys.rtp_xtn_hdr_cipher.is_none());
    }

    #[test]
    fn gcm_salts_are_zero_padded() {
        let p = policy(CryptoPolicy::aes_gcm_128_16_auth(), 28);
        let keys = SessionKeys::new(&p, &p.keys[0]).unwrap();
        assert_eq!(&keys.salt[AEAD_SALT_LEN..], &[0, 0]);
        assert!(keys.rtp_is_aead());
    }

    #[test]
    fn gcm_header_extensions_use_counter_mode() {
        let p = policy(CryptoPolicy::aes_gcm_256_16_auth(), 44).with_enc_xtn_hdr(vec![1]);
        let keys = SessionKeys::new(&p, &p.keys[0]).unwrap();
        let xtn = keys.rtp_xtn_hdr_cipher.as_ref().unwrap();
        assert_eq!(xtn.cipher_type(), CipherType::AesIcm256);
    }

    #[test]
    fn clones_share_the_usage_limit() {
        let p = policy(CryptoPolicy::rtp_default(), 30);
        let keys = SessionKeys::new(&p, &p.keys[0]).unwrap();
        let copy = keys.clone();
        copy.limit.update();
        assert!(Arc::ptr_eq(keys.limit(), copy.limit()));
        assert_eq!(keys.limit().remaining(), p.key_limit - 1);
    }

    #[test]
    fn null_cipher_keys_without_master_key_material() {
        let p = policy(CryptoPolicy::null_cipher_hmac_sha1_80(), 0);
        let keys = SessionKeys::new(&p, &p.keys[0]).unwrap();
        assert_eq!(keys.salt, [0u8; SALT_LEN]);
    }
}

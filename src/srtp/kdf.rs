use zeroize::Zeroizing;

use crate::srtp::cipher::{AesIcm, CipherDirection, CipherType, SrtpCipher};
use crate::srtp::constants::{AES_128_KEY_LEN, AES_192_KEY_LEN, AES_256_KEY_LEN, SALT_LEN};
use crate::srtp::srtp_error::SrtpError;

/// AES-CM pseudo-random function used to derive session keys
/// (RFC 3711 §4.3.3, RFC 6188 §3 for the larger key sizes).
///
/// The key derivation rate is always zero, so the IV is just the label at
/// byte 7. An empty master key derives all-zero material.
pub(crate) struct Kdf {
    prf: Option<AesIcm>,
}

impl Kdf {
    pub(crate) fn new(master_key: &[u8], master_salt: &[u8]) -> Result<Self, SrtpError> {
        let cipher_type = match master_key.len() {
            0 => return Ok(Self { prf: None }),
            AES_128_KEY_LEN => CipherType::AesIcm128,
            AES_192_KEY_LEN => CipherType::AesIcm192,
            AES_256_KEY_LEN => CipherType::AesIcm256,
            _ => return Err(SrtpError::BadParam),
        };
        if master_salt.len() > SALT_LEN {
            return Err(SrtpError::BadParam);
        }

        let mut keying = Zeroizing::new(vec![0u8; master_key.len() + SALT_LEN]);
        keying[..master_key.len()].copy_from_slice(master_key);
        keying[master_key.len()..master_key.len() + master_salt.len()].copy_from_slice(master_salt);

        let mut prf = AesIcm::new(cipher_type, keying.len())?;
        prf.init(&keying)?;
        Ok(Self { prf: Some(prf) })
    }

    pub(crate) fn generate(&mut self, label: u8, out: &mut [u8]) -> Result<(), SrtpError> {
        let Some(prf) = self.prf.as_mut() else {
            out.fill(0);
            return Ok(());
        };
        let mut iv = [0u8; 16];
        iv[7] = label;
        prf.set_iv(&iv, CipherDirection::Encrypt)?;
        prf.output(out)
    }
}

use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::srtp::auth::{AuthType, SrtpAuth};
use crate::srtp::constants::{HMAC_SHA1_DIGEST_LEN, HMAC_SHA1_KEY_LEN};
use crate::srtp::srtp_error::SrtpError;

type HmacSha1 = Hmac<Sha1>;

/// HMAC-SHA1 truncated to `tag_len` bytes (RFC 3711 §4.2.1).
#[derive(Clone)]
pub struct HmacSha1Auth {
    key_len: usize,
    tag_len: usize,
    key: Zeroizing<Vec<u8>>,
    mac: Option<HmacSha1>,
}

impl HmacSha1Auth {
    pub fn new(key_len: usize, tag_len: usize) -> Result<Self, SrtpError> {
        if key_len > HMAC_SHA1_KEY_LEN || tag_len > HMAC_SHA1_DIGEST_LEN {
            return Err(SrtpError::BadParam);
        }
        Ok(Self {
            key_len,
            tag_len,
            key: Zeroizing::new(Vec::new()),
            mac: None,
        })
    }

    fn running(&mut self) -> Result<&mut HmacSha1, SrtpError> {
        self.mac.as_mut().ok_or(SrtpError::AuthFail)
    }
}

impl SrtpAuth for HmacSha1Auth {
    fn auth_type(&self) -> AuthType {
        AuthType::HmacSha1
    }

    fn key_len(&self) -> usize {
        self.key_len
    }

    fn tag_len(&self) -> usize {
        self.tag_len
    }

    fn init(&mut self, key: &[u8]) -> Result<(), SrtpError> {
        if key.len() < self.key_len {
            return Err(SrtpError::InitFail);
        }
        self.key = Zeroizing::new(key[..self.key_len].to_vec());
        self.mac = None;
        Ok(())
    }

    fn start(&mut self) -> Result<(), SrtpError> {
        self.mac = Some(HmacSha1::new_from_slice(&self.key).map_err(|_| SrtpError::InitFail)?);
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), SrtpError> {
        self.running()?.update(data);
        Ok(())
    }

    fn compute(&mut self, data: &[u8], tag: &mut [u8]) -> Result<(), SrtpError> {
        if tag.len() < self.tag_len {
            return Err(SrtpError::BadParam);
        }
        let mut mac = self.mac.take().ok_or(SrtpError::AuthFail)?;
        mac.update(data);
        let digest = mac.finalize().into_bytes();
        tag[..self.tag_len].copy_from_slice(&digest[..self.tag_len]);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SrtpAuth> {
        let mut a = self.clone();
        a.mac = None;
        Box::new(a)
    }
}

// RFC 2202 test case 1
const TEST_KEY: [u8; 20] = [0x0b; 20];
const TEST_DATA: &[u8] = b"Hi There";
const TEST_TAG: &str = "b617318655057264e28bc0b6fb378c8ef146be00";

pub(crate) fn self_test() -> Result<(), SrtpError> {
    let expected = hex::decode(TEST_TAG).map_err(|_| SrtpError::AuthFail)?;
    let mut a = HmacSha1Auth::new(HMAC_SHA1_KEY_LEN, HMAC_SHA1_DIGEST_LEN)?;
    a.init(&TEST_KEY)?;
    a.start()?;
    let mut tag = [0u8; HMAC_SHA1_DIGEST_LEN];
    a.compute(TEST_DATA, &mut tag)?;
    if tag[..] != expected[..] {
        return Err(SrtpError::AuthFail);
    }
    Ok(())
}

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::srtp::master_key::MasterKey;
use crate::srtp::srtp_error::SrtpError;
use crate::srtp::srtp_profile::SrtpProfile;

/// One side's share of DTLS-SRTP keying material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SrtpEndpointKeys {
    pub master_key: Vec<u8>,
    pub master_salt: Vec<u8>,
}

impl SrtpEndpointKeys {
    pub fn new(master_key: impl Into<Vec<u8>>, master_salt: impl Into<Vec<u8>>) -> Self {
        Self {
            master_key: master_key.into(),
            master_salt: master_salt.into(),
        }
    }

    /// `key || salt` as the engine expects it, after checking both lengths
    /// against `profile`.
    pub fn to_master_key(&self, profile: SrtpProfile) -> Result<MasterKey, SrtpError> {
        if self.master_key.len() != profile.master_key_len()
            || self.master_salt.len() != profile.master_salt_len()
        {
            return Err(SrtpError::BadParam);
        }
        let mut material = Vec::with_capacity(self.master_key.len() + self.master_salt.len());
        material.extend_from_slice(&self.master_key);
        material.extend_from_slice(&self.master_salt);
        Ok(MasterKey::new(material))
    }
}

impl fmt::Debug for SrtpEndpointKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SrtpEndpointKeys")
            .field("key_len", &self.master_key.len())
            .field("salt_len", &self.master_salt.len())
            .finish()
    }
}

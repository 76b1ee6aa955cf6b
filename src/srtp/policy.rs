use crate::srtp::auth::AuthType;
use crate::srtp::cipher::CipherType;
use crate::srtp::constants::{
    DEFAULT_KEY_LIMIT, DEFAULT_KEY_SOFT_LIMIT, HMAC_SHA1_DIGEST_LEN, HMAC_SHA1_KEY_LEN,
    MAX_MKI_LEN, MAX_NUM_MASTER_KEYS,
};
use crate::srtp::crypto_policy::CryptoPolicy;
use crate::srtp::master_key::MasterKey;
use crate::srtp::replay_window::ReplayWindow;
use crate::srtp::srtp_error::SrtpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsrcType {
    /// Exactly one SSRC.
    Specific,
    /// Template for every SSRC seen on unprotect.
    AnyInbound,
    /// Template for every SSRC seen on protect.
    AnyOutbound,
}

impl SsrcType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "specific" => Some(SsrcType::Specific),
            "any_inbound" => Some(SsrcType::AnyInbound),
            "any_outbound" => Some(SsrcType::AnyOutbound),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ssrc {
    pub kind: SsrcType,
    pub value: u32,
}

impl Ssrc {
    pub fn specific(value: u32) -> Self {
        Self {
            kind: SsrcType::Specific,
            value,
        }
    }

    pub fn any_inbound() -> Self {
        Self {
            kind: SsrcType::AnyInbound,
            value: 0,
        }
    }

    pub fn any_outbound() -> Self {
        Self {
            kind: SsrcType::AnyOutbound,
            value: 0,
        }
    }
}

/// Everything needed to set up one stream (or a template).
#[derive(Debug, Clone)]
pub struct Policy {
    pub ssrc: Ssrc,
    pub rtp: CryptoPolicy,
    pub rtcp: CryptoPolicy,
    pub keys: Vec<MasterKey>,
    /// 0 selects the default of 128 packets.
    pub window_size: usize,
    /// Lets the sender re-protect an index it already used (retransmission).
    pub allow_repeat_tx: bool,
    /// RTP header extension ids to encrypt (RFC 6904).
    pub enc_xtn_hdr: Vec<u8>,
    pub key_limit: u64,
    pub key_soft_limit: u64,
}

impl Policy {
    pub fn new(ssrc: Ssrc, rtp: CryptoPolicy, rtcp: CryptoPolicy, key: MasterKey) -> Self {
        Self {
            ssrc,
            rtp,
            rtcp,
            keys: vec![key],
            window_size: 0,
            allow_repeat_tx: false,
            enc_xtn_hdr: Vec::new(),
            key_limit: DEFAULT_KEY_LIMIT,
            key_soft_limit: DEFAULT_KEY_SOFT_LIMIT,
        }
    }

    pub fn with_keys(mut self, keys: Vec<MasterKey>) -> Self {
        self.keys = keys;
        self
    }
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }
    pub fn with_allow_repeat_tx(mut self, allow: bool) -> Self {
        self.allow_repeat_tx = allow;
        self
    }
    pub fn with_enc_xtn_hdr(mut self, ids: Vec<u8>) -> Self {
        self.enc_xtn_hdr = ids;
        self
    }
    pub fn with_key_limit(mut self, limit: u64, soft_limit: u64) -> Self {
        self.key_limit = limit;
        self.key_soft_limit = soft_limit;
        self
    }

    pub fn validate(&self) -> Result<(), SrtpError> {
        if self.keys.is_empty() || self.keys.len() > MAX_NUM_MASTER_KEYS {
            return Err(SrtpError::BadParam);
        }
        if !ReplayWindow::valid_size(self.window_size) {
            return Err(SrtpError::BadParam);
        }
        validate_crypto(&self.rtp)?;
        validate_crypto(&self.rtcp)?;

        let needed = self.rtp.cipher_key_len.max(self.rtcp.cipher_key_len);
        for key in &self.keys {
            if key.mki_size() > MAX_MKI_LEN || key.key().len() < needed {
                return Err(SrtpError::BadParam);
            }
        }
        Ok(())
    }
}

fn validate_crypto(p: &CryptoPolicy) -> Result<(), SrtpError> {
    if p.cipher_type != CipherType::Null && p.cipher_key_len != p.cipher_type.key_len_with_salt() {
        return Err(SrtpError::BadParam);
    }
    match p.auth_type {
        AuthType::Null => {
            if !p.cipher_type.is_aead() && p.auth_tag_len != 0 {
                return Err(SrtpError::BadParam);
            }
        }
        AuthType::HmacSha1 => {
            if p.cipher_type.is_aead()
                || p.auth_key_len > HMAC_SHA1_KEY_LEN
                || p.auth_tag_len > HMAC_SHA1_DIGEST_LEN
            {
                return Err(SrtpError::BadParam);
            }
        }
    }
    Ok(())
}

//! Message authentication for SRTP and SRTCP.

pub mod hmac_sha1;
pub mod null_auth;

use std::fmt;

use crate::srtp::srtp_error::SrtpError;

pub use hmac_sha1::HmacSha1Auth;
pub use null_auth::NullAuth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    Null,
    HmacSha1,
}

impl AuthType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(AuthType::Null),
            "hmac_sha1" => Some(AuthType::HmacSha1),
            _ => None,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Null => write!(f, "null"),
            AuthType::HmacSha1 => write!(f, "hmac_sha1"),
        }
    }
}

pub trait SrtpAuth: Send {
    fn auth_type(&self) -> AuthType;
    fn key_len(&self) -> usize;
    fn tag_len(&self) -> usize;

    /// Keystream bytes prepended to the tag. Zero for every shipped MAC.
    fn prefix_len(&self) -> usize {
        0
    }

    fn init(&mut self, key: &[u8]) -> Result<(), SrtpError>;

    /// Resets the running MAC so a new message can be fed.
    fn start(&mut self) -> Result<(), SrtpError>;

    fn update(&mut self, data: &[u8]) -> Result<(), SrtpError>;

    /// Feeds the final chunk and writes `tag_len` bytes into `tag`.
    fn compute(&mut self, data: &[u8], tag: &mut [u8]) -> Result<(), SrtpError>;

    fn box_clone(&self) -> Box<dyn SrtpAuth>;
}

impl Clone for Box<dyn SrtpAuth> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

pub fn new_auth(
    auth_type: AuthType,
    key_len: usize,
    tag_len: usize,
) -> Result<Box<dyn SrtpAuth>, SrtpError> {
    match auth_type {
        AuthType::Null => Ok(Box::new(NullAuth::new(key_len, tag_len))),
        AuthType::HmacSha1 => Ok(Box::new(HmacSha1Auth::new(key_len, tag_len)?)),
    }
}

pub fn self_test(auth_type: AuthType) -> Result<(), SrtpError> {
    match auth_type {
        AuthType::Null => null_auth::self_test(),
        AuthType::HmacSha1 => hmac_sha1::self_test(),
    }
}

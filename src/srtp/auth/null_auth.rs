use crate::srtp::auth::{AuthType, SrtpAuth};
use crate::srtp::srtp_error::SrtpError;

/// Reports a tag length but never writes a tag. GCM policies carry their tag
/// length through this so trailer sizes come out right.
#[derive(Debug, Clone)]
pub struct NullAuth {
    key_len: usize,
    tag_len: usize,
}

impl NullAuth {
    pub fn new(key_len: usize, tag_len: usize) -> Self {
        Self { key_len, tag_len }
    }
}

impl SrtpAuth for NullAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::Null
    }

    fn key_len(&self) -> usize {
        self.key_len
    }

    fn tag_len(&self) -> usize {
        self.tag_len
    }

    fn init(&mut self, _key: &[u8]) -> Result<(), SrtpError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), SrtpError> {
        Ok(())
    }

    fn update(&mut self, _data: &[u8]) -> Result<(), SrtpError> {
        Ok(())
    }

    fn compute(&mut self, _data: &[u8], _tag: &mut [u8]) -> Result<(), SrtpError> {
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SrtpAuth> {
        Box::new(self.clone())
    }
}

pub(crate) fn self_test() -> Result<(), SrtpError> {
    let mut a = NullAuth::new(0, 0);
    let mut tag = [0xaau8; 4];
    a.start()?;
    a.compute(b"anything", &mut tag)?;
    if tag != [0xaa; 4] {
        return Err(SrtpError::AuthFail);
    }
    Ok(())
}

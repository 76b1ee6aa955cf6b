use crate::srtp::cipher::{CipherDirection, CipherType, SrtpCipher};
use crate::srtp::srtp_error::SrtpError;

/// Identity transform. Accepts any key and writes zero keystream.
#[derive(Debug, Clone)]
pub struct NullCipher {
    key_len: usize,
}

impl NullCipher {
    pub fn new(key_len: usize) -> Self {
        Self { key_len }
    }
}

impl SrtpCipher for NullCipher {
    fn cipher_type(&self) -> CipherType {
        CipherType::Null
    }

    fn key_len(&self) -> usize {
        self.key_len
    }

    fn init(&mut self, _key: &[u8]) -> Result<(), SrtpError> {
        Ok(())
    }

    fn set_iv(&mut self, _iv: &[u8], _direction: CipherDirection) -> Result<(), SrtpError> {
        Ok(())
    }

    fn encrypt(&mut self, _buf: &mut [u8]) -> Result<(), SrtpError> {
        Ok(())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> Result<usize, SrtpError> {
        Ok(buf.len())
    }

    fn output(&mut self, out: &mut [u8]) -> Result<(), SrtpError> {
        out.fill(0);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn SrtpCipher> {
        Box::new(self.clone())
    }
}

pub(crate) fn self_test() -> Result<(), SrtpError> {
    let plaintext = [0x5au8; 32];
    let mut buf = plaintext;
    let mut c = NullCipher::new(0);
    c.init(&[])?;
    c.set_iv(&[0u8; 16], CipherDirection::Encrypt)?;
    c.encrypt(&mut buf)?;
    if buf != plaintext {
        return Err(SrtpError::CipherFail);
    }
    Ok(())
}

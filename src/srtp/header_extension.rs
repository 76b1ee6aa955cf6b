//! RFC 6904 encryption of RTP header extension elements.
//!
//! Each element consumes keystream for its header bytes plus its data, so
//! sender and receiver stay in step whether or not an element is encrypted.
//! The transform is its own inverse.

use byteorder::{BigEndian, ByteOrder};

use crate::srtp::cipher::SrtpCipher;
use crate::srtp::constants::{
    ONE_BYTE_EXTENSION_PROFILE, RTP_EXTENSION_HEADER_LEN, TWO_BYTE_EXTENSION_PROFILE,
    TWO_BYTE_EXTENSION_PROFILE_MASK,
};
use crate::srtp::srtp_error::SrtpError;

const ONE_BYTE_TERMINATOR_ID: u8 = 15;

/// XORs every element whose id is in `ids` with keystream from `cipher`.
/// `ext` is the whole extension: the 4-byte header followed by its data.
pub(crate) fn process(
    ext: &mut [u8],
    cipher: &mut dyn SrtpCipher,
    ids: &[u8],
) -> Result<(), SrtpError> {
    if ext.len() < RTP_EXTENSION_HEADER_LEN {
        return Err(SrtpError::ParseErr);
    }
    let profile = BigEndian::read_u16(&ext[0..2]);
    let data = &mut ext[RTP_EXTENSION_HEADER_LEN..];

    if profile == ONE_BYTE_EXTENSION_PROFILE {
        one_byte(data, cipher, ids)
    } else if profile & TWO_BYTE_EXTENSION_PROFILE_MASK == TWO_BYTE_EXTENSION_PROFILE {
        two_byte(data, cipher, ids)
    } else {
        Err(SrtpError::ParseErr)
    }
}

fn one_byte(data: &mut [u8], cipher: &mut dyn SrtpCipher, ids: &[u8]) -> Result<(), SrtpError> {
    let end = data.len();
    let mut keystream = [0u8; 1 + 16];
    let mut pos = 0;
    while pos < end {
        let id = data[pos] >> 4;
        let len = usize::from(data[pos] & 0x0f) + 1;
        pos += 1;
        if pos + len > end {
            return Err(SrtpError::ParseErr);
        }
        if id == ONE_BYTE_TERMINATOR_ID {
            break;
        }

        let ks = &mut keystream[..1 + len];
        cipher.output(ks).map_err(|_| SrtpError::CipherFail)?;
        if ids.contains(&id) {
            for (b, k) in data[pos..pos + len].iter_mut().zip(&ks[1..]) {
                *b ^= k;
            }
        }
        pos += len;
        pos = skip_padding(data, pos);
    }
    Ok(())
}

fn two_byte(data: &mut [u8], cipher: &mut dyn SrtpCipher, ids: &[u8]) -> Result<(), SrtpError> {
    let end = data.len();
    let mut keystream = [0u8; 2 + 255];
    let mut pos = 0;
    while pos + 1 < end {
        let id = data[pos];
        let len = usize::from(data[pos + 1]);
        pos += 2;
        if pos + len > end {
            return Err(SrtpError::ParseErr);
        }

        let ks = &mut keystream[..2 + len];
        cipher.output(ks).map_err(|_| SrtpError::CipherFail)?;
        if len > 0 && ids.contains(&id) {
            for (b, k) in data[pos..pos + len].iter_mut().zip(&ks[2..]) {
                *b ^= k;
            }
        }
        pos += len;
        pos = skip_padding(data, pos);
    }
    Ok(())
}

fn skip_padding(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() && data[pos] == 0 {
        pos += 1;
    }
    pos
}

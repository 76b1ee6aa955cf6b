use byteorder::{BigEndian, ByteOrder};

use crate::srtp::constants::{RTP_EXTENSION_HEADER_LEN, RTP_HEADER_LEN};
use crate::srtp::srtp_error::SrtpError;

/// Offsets of the parts of an RTP header inside a packet buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RtpHeaderLayout {
    pub seq: u16,
    pub ssrc: u32,
    /// Offset of the 4-byte extension header (profile, length), if X is set.
    pub ext_start: Option<usize>,
    /// Fixed header + CSRCs + extension; the payload starts here.
    pub header_len: usize,
}

impl RtpHeaderLayout {
    /// Validates the header against the first `len` bytes of `packet`.
    pub fn parse(packet: &[u8]) -> Result<Self, SrtpError> {
        if packet.len() < RTP_HEADER_LEN {
            return Err(SrtpError::BadParam);
        }
        let cc = usize::from(packet[0] & 0x0F);
        let x = (packet[0] & 0x10) != 0;

        let mut len = RTP_HEADER_LEN + cc * 4;
        let mut ext_start = None;

        if x {
            if packet.len() < len + RTP_EXTENSION_HEADER_LEN {
                return Err(SrtpError::BadParam);
            }
            ext_start = Some(len);
            let ext_words = usize::from(BigEndian::read_u16(&packet[len + 2..len + 4]));
            len += RTP_EXTENSION_HEADER_LEN + ext_words * 4;
        }

        if packet.len() < len {
            return Err(SrtpError::BadParam);
        }
        Ok(Self {
            seq: BigEndian::read_u16(&packet[2..4]),
            ssrc: BigEndian::read_u32(&packet[8..12]),
            ext_start,
            header_len: len,
        })
    }
}

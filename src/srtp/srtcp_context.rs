use byteorder::{BigEndian, ByteOrder};

use crate::srtp::cipher::CipherDirection;
use crate::srtp::constants::{RTCP_HEADER_LEN, SRTCP_E_BIT, SRTCP_INDEX_MASK, SRTCP_TRAILER_LEN};
use crate::srtp::crypto_policy::SecurityServices;
use crate::srtp::event::SrtpEvent;
use crate::srtp::rtcp_replay_window::RtcpReplayWindow;
use crate::srtp::session_keys::SessionKeys;
use crate::srtp::srtp_error::SrtpError;
use crate::srtp::srtp_session::SrtpSession;
use crate::srtp::stream_context::Direction;
use crate::srtp::utils::{constant_time_eq, rtcp_aead_iv, rtcp_iv};
use crate::{sink_trace, sink_warn};

impl SrtpSession {
    /// Protects a compound RTCP packet in place, appending the SRTCP index
    /// word and the trailer.
    pub fn protect_rtcp(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        self.protect_rtcp_mki(packet, false, 0)
    }

    pub fn protect_rtcp_mki(
        &mut self,
        packet: &mut Vec<u8>,
        use_mki: bool,
        mki_index: usize,
    ) -> Result<(), SrtpError> {
        if packet.len() < RTCP_HEADER_LEN {
            return Err(SrtpError::BadParam);
        }
        let ssrc = BigEndian::read_u32(&packet[4..8]);
        let (stream, notifier) = self.sender_stream(ssrc, false)?;
        if !stream.claim_direction(Direction::Sender) {
            notifier.raise(ssrc, SrtpEvent::SsrcCollision);
        }

        let key_idx = stream.key_index_for_protect(use_mki, mki_index)?;
        let index = stream
            .rtcp_rdb
            .increment()
            .inspect_err(|_| notifier.raise(ssrc, SrtpEvent::PacketIndexLimit))?;

        let encrypt = stream.rtcp_services.confidentiality();
        let trailer = if encrypt { SRTCP_E_BIT | index } else { index };
        let keys = &mut stream.session_keys[key_idx];
        if keys.rtcp_is_aead() {
            seal_aead(keys, packet, ssrc, index, trailer, encrypt, use_mki)?;
        } else {
            seal(keys, packet, ssrc, index, trailer, encrypt, use_mki)?;
        }

        sink_trace!(
            notifier.logger,
            "[SRTCP] Protected SSRC={:#x} Index={} Len={}",
            ssrc,
            index,
            packet.len()
        );
        Ok(())
    }

    /// Verifies and decrypts an SRTCP packet in place, stripping the index
    /// word and the trailer.
    pub fn unprotect_rtcp(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        self.unprotect_rtcp_mki(packet, false)
    }

    pub fn unprotect_rtcp_mki(&mut self, packet: &mut Vec<u8>, use_mki: bool) -> Result<(), SrtpError> {
        if packet.len() < RTCP_HEADER_LEN + SRTCP_TRAILER_LEN {
            return Err(SrtpError::BadParam);
        }
        let ssrc = BigEndian::read_u32(&packet[4..8]);

        let (index, plain_len, provisional) = {
            let (stream, provisional, notifier) = self.receiver_stream(ssrc)?;
            let key_idx = stream.key_index_for_unprotect(packet, use_mki, stream.rtcp_auth_tag_len())?;
            let mki_len = if use_mki {
                stream.session_keys[key_idx].mki_size()
            } else {
                0
            };

            let keys = &mut stream.session_keys[key_idx];
            let opened = if keys.rtcp_is_aead() {
                open_aead(keys, &stream.rtcp_rdb, packet, ssrc, mki_len)
            } else {
                open(keys, stream.rtcp_services, &stream.rtcp_rdb, packet, ssrc, mki_len)
            };
            let (index, plain_len) = opened.inspect_err(|e| {
                sink_warn!(notifier.logger, "[SRTCP] Unprotect failed SSRC={:#x}: {}", ssrc, e)
            })?;

            if !stream.claim_direction(Direction::Receiver) {
                notifier.raise(ssrc, SrtpEvent::SsrcCollision);
            }
            (index, plain_len, provisional)
        };

        let stream = if provisional {
            self.promote(ssrc)?
        } else {
            self.streams.get_mut(&ssrc).ok_or(SrtpError::NoCtx)?
        };
        stream.rtcp_rdb.add_index(index)?;
        packet.truncate(plain_len);

        sink_trace!(self.logger, "[SRTCP] Unprotected SSRC={:#x} Index={}", ssrc, index);
        Ok(())
    }
}

fn rtcp_tag(keys: &mut SessionKeys, authenticated: &[u8]) -> Result<Vec<u8>, SrtpError> {
    let auth = keys.rtcp_auth.as_mut();
    let mut tag = vec![0u8; auth.tag_len()];
    auth.start()?;
    auth.compute(authenticated, &mut tag)?;
    Ok(tag)
}

/// `[header][payload][E|index][MKI][tag]`; the tag covers everything up to
/// the MKI.
fn seal(
    keys: &mut SessionKeys,
    packet: &mut Vec<u8>,
    ssrc: u32,
    index: u32,
    trailer: u32,
    encrypt: bool,
    use_mki: bool,
) -> Result<(), SrtpError> {
    let iv = rtcp_iv(keys.rtcp_cipher.cipher_type(), ssrc, index);
    keys.rtcp_cipher.set_iv(&iv, CipherDirection::Encrypt)?;
    if encrypt {
        keys.rtcp_cipher.encrypt(&mut packet[RTCP_HEADER_LEN..])?;
    }

    let mut word = [0u8; SRTCP_TRAILER_LEN];
    BigEndian::write_u32(&mut word, trailer);
    packet.extend_from_slice(&word);

    let tag = rtcp_tag(keys, packet)?;
    if use_mki {
        packet.extend_from_slice(&keys.mki_id);
    }
    packet.extend_from_slice(&tag);
    Ok(())
}

/// `[header][ciphertext][tag][E|index][MKI]` (RFC 7714 §9). Without
/// encryption the whole packet is associated data and only a tag is
/// produced.
fn seal_aead(
    keys: &mut SessionKeys,
    packet: &mut Vec<u8>,
    ssrc: u32,
    index: u32,
    trailer: u32,
    encrypt: bool,
    use_mki: bool,
) -> Result<(), SrtpError> {
    let iv = rtcp_aead_iv(keys.aead_c_salt(), ssrc, index);
    keys.rtcp_cipher.set_iv(&iv, CipherDirection::Encrypt)?;

    let mut word = [0u8; SRTCP_TRAILER_LEN];
    BigEndian::write_u32(&mut word, trailer);
    if encrypt {
        keys.rtcp_cipher.set_aad(&packet[..RTCP_HEADER_LEN])?;
        keys.rtcp_cipher.set_aad(&word)?;
        keys.rtcp_cipher.encrypt(&mut packet[RTCP_HEADER_LEN..])?;
    } else {
        keys.rtcp_cipher.set_aad(packet)?;
        keys.rtcp_cipher.set_aad(&word)?;
        keys.rtcp_cipher.encrypt(&mut [0u8; 0])?;
    }

    let mut tag = vec![0u8; keys.rtcp_cipher.tag_len()];
    let n = keys.rtcp_cipher.get_tag(&mut tag)?;
    packet.extend_from_slice(&tag[..n]);
    packet.extend_from_slice(&word);
    if use_mki {
        packet.extend_from_slice(&keys.mki_id);
    }
    Ok(())
}

/// Inverse of [`seal`]. Returns the SRTCP index and the RTCP length.
fn open(
    keys: &mut SessionKeys,
    services: SecurityServices,
    rdb: &RtcpReplayWindow,
    packet: &mut [u8],
    ssrc: u32,
    mki_len: usize,
) -> Result<(u32, usize), SrtpError> {
    let tag_len = keys.rtcp_auth.tag_len();
    let len = packet.len();
    if len < RTCP_HEADER_LEN + tag_len + mki_len + SRTCP_TRAILER_LEN {
        return Err(SrtpError::BadParam);
    }
    let auth_len = len - tag_len - mki_len;
    let trailer_at = auth_len - SRTCP_TRAILER_LEN;
    let trailer = BigEndian::read_u32(&packet[trailer_at..auth_len]);

    let encrypted = trailer & SRTCP_E_BIT != 0;
    if encrypted != services.confidentiality() {
        return Err(SrtpError::CantCheck);
    }
    let index = trailer & SRTCP_INDEX_MASK;
    rdb.check(index)?;

    let iv = rtcp_iv(keys.rtcp_cipher.cipher_type(), ssrc, index);
    keys.rtcp_cipher.set_iv(&iv, CipherDirection::Decrypt)?;

    let expected = rtcp_tag(keys, &packet[..auth_len])?;
    if !constant_time_eq(&expected, &packet[len - tag_len..]) {
        return Err(SrtpError::AuthFail);
    }

    if encrypted {
        keys.rtcp_cipher.decrypt(&mut packet[RTCP_HEADER_LEN..trailer_at])?;
    }
    Ok((index, trailer_at))
}

/// Inverse of [`seal_aead`]. The E-bit is taken from the packet.
fn open_aead(
    keys: &mut SessionKeys,
    rdb: &RtcpReplayWindow,
    packet: &mut [u8],
    ssrc: u32,
    mki_len: usize,
) -> Result<(u32, usize), SrtpError> {
    let tag_len = keys.rtcp_cipher.tag_len();
    let len = packet.len();
    if len < RTCP_HEADER_LEN + tag_len + mki_len + SRTCP_TRAILER_LEN {
        return Err(SrtpError::BadParam);
    }
    let trailer_at = len - mki_len - SRTCP_TRAILER_LEN;
    let tag_start = trailer_at - tag_len;
    let mut word = [0u8; SRTCP_TRAILER_LEN];
    word.copy_from_slice(&packet[trailer_at..trailer_at + SRTCP_TRAILER_LEN]);
    let trailer = BigEndian::read_u32(&word);

    let index = trailer & SRTCP_INDEX_MASK;
    rdb.check(index)?;

    let iv = rtcp_aead_iv(keys.aead_c_salt(), ssrc, index);
    keys.rtcp_cipher.set_iv(&iv, CipherDirection::Decrypt)?;

    if trailer & SRTCP_E_BIT != 0 {
        keys.rtcp_cipher.set_aad(&packet[..RTCP_HEADER_LEN])?;
        keys.rtcp_cipher.set_aad(&word)?;
        let plain = keys.rtcp_cipher.decrypt(&mut packet[RTCP_HEADER_LEN..trailer_at])?;
        Ok((index, RTCP_HEADER_LEN + plain))
    } else {
        keys.rtcp_cipher.set_aad(&packet[..tag_start])?;
        keys.rtcp_cipher.set_aad(&word)?;
        keys.rtcp_cipher.decrypt(&mut packet[tag_start..trailer_at])?;
        Ok((index, tag_start))
    }
}

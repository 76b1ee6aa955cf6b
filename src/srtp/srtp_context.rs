use byteorder::{BigEndian, ByteOrder};

use crate::srtp::cipher::CipherDirection;
use crate::srtp::constants::MAX_PACKET_INDEX;
use crate::srtp::crypto_policy::SecurityServices;
use crate::srtp::event::SrtpEvent;
use crate::srtp::header_extension;
use crate::srtp::key_limit::KeyEvent;
use crate::srtp::replay_window::IndexEstimate;
use crate::srtp::rtp_header_layout::RtpHeaderLayout;
use crate::srtp::session_keys::SessionKeys;
use crate::srtp::srtp_error::SrtpError;
use crate::srtp::srtp_session::{Notifier, SrtpSession};
use crate::srtp::stream_context::{Direction, StreamContext};
use crate::srtp::utils::{constant_time_eq, rtp_aead_iv, rtp_iv};
use crate::{sink_trace, sink_warn};

impl SrtpSession {
    /// Protects the RTP packet in `packet` in place and appends the trailer.
    ///
    /// The buffer must hold exactly one RTP packet; it grows by at most
    /// [`get_protect_trailer_length`](Self::get_protect_trailer_length)
    /// bytes.
    pub fn protect(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        self.protect_mki(packet, false, 0)
    }

    /// Like [`protect`](Self::protect), keyed with master key `mki_index`
    /// and carrying its MKI when `use_mki` is set.
    pub fn protect_mki(
        &mut self,
        packet: &mut Vec<u8>,
        use_mki: bool,
        mki_index: usize,
    ) -> Result<(), SrtpError> {
        let hdr = RtpHeaderLayout::parse(packet)?;
        let (stream, notifier) = self.sender_stream(hdr.ssrc, true)?;
        if !stream.claim_direction(Direction::Sender) {
            notifier.raise(hdr.ssrc, SrtpEvent::SsrcCollision);
        }

        let key_idx = stream.key_index_for_protect(use_mki, mki_index)?;
        charge_key(&stream.session_keys[key_idx], hdr.ssrc, &notifier)?;
        let index = advance_sender_index(stream, hdr.seq, &notifier)?;

        let keys = &mut stream.session_keys[key_idx];
        if keys.rtp_is_aead() {
            seal_aead(keys, &stream.enc_xtn_hdr, packet, &hdr, index, use_mki)?;
        } else {
            seal(keys, stream.rtp_services, &stream.enc_xtn_hdr, packet, &hdr, index, use_mki)?;
        }

        sink_trace!(
            notifier.logger,
            "[SRTP] Protected SSRC={:#x} Seq={} Index={:#x} Len={}",
            hdr.ssrc,
            hdr.seq,
            index,
            packet.len()
        );
        Ok(())
    }

    /// Verifies and decrypts an SRTP packet in place, stripping the trailer.
    ///
    /// On any error the stream state is left as it was; the packet buffer
    /// may hold partially processed bytes and should be dropped.
    pub fn unprotect(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        self.unprotect_mki(packet, false)
    }

    /// Like [`unprotect`](Self::unprotect); with `use_mki` the master key
    /// is picked by the MKI carried in the packet.
    pub fn unprotect_mki(&mut self, packet: &mut Vec<u8>, use_mki: bool) -> Result<(), SrtpError> {
        let hdr = RtpHeaderLayout::parse(packet)?;
        let ssrc = hdr.ssrc;

        let (est, plain_len, provisional) = {
            let (stream, provisional, notifier) = self.receiver_stream(ssrc)?;
            let est = if provisional {
                // No state for this SSRC yet: trust the header until the
                // packet authenticates.
                IndexEstimate::Near {
                    index: u64::from(hdr.seq),
                    delta: i32::from(hdr.seq),
                }
            } else {
                receiver_estimate(stream, hdr.seq).inspect_err(|e| {
                    sink_warn!(
                        notifier.logger,
                        "[SRTP] Rejected SSRC={:#x} Seq={}: {}",
                        ssrc,
                        hdr.seq,
                        e
                    )
                })?
            };

            let key_idx = stream.key_index_for_unprotect(packet, use_mki, stream.rtp_auth_tag_len())?;
            let mki_len = if use_mki {
                stream.session_keys[key_idx].mki_size()
            } else {
                0
            };

            let keys = &mut stream.session_keys[key_idx];
            let opened = if keys.rtp_is_aead() {
                open_aead(keys, &stream.enc_xtn_hdr, packet, &hdr, est.index(), mki_len, &notifier)
            } else {
                let services = stream.rtp_services;
                open(keys, services, &stream.enc_xtn_hdr, packet, &hdr, est.index(), mki_len, &notifier)
            };
            let plain_len = opened.inspect_err(|e| {
                sink_warn!(
                    notifier.logger,
                    "[SRTP] Unprotect failed SSRC={:#x} Seq={}: {}",
                    ssrc,
                    hdr.seq,
                    e
                )
            })?;

            if !stream.claim_direction(Direction::Receiver) {
                notifier.raise(ssrc, SrtpEvent::SsrcCollision);
            }
            (est, plain_len, provisional)
        };

        let stream = if provisional {
            self.promote(ssrc)?
        } else {
            self.streams.get_mut(&ssrc).ok_or(SrtpError::NoCtx)?
        };
        commit_index(stream, est)?;
        packet.truncate(plain_len);

        sink_trace!(
            self.logger,
            "[SRTP] Unprotected SSRC={:#x} Seq={} Index={:#x}",
            ssrc,
            hdr.seq,
            est.index()
        );
        Ok(())
    }
}

/// Charges one RTP packet against the key's usage budget.
fn charge_key(keys: &SessionKeys, ssrc: u32, notifier: &Notifier<'_>) -> Result<(), SrtpError> {
    match keys.limit().update() {
        KeyEvent::Normal => Ok(()),
        KeyEvent::SoftLimit => {
            notifier.raise(ssrc, SrtpEvent::KeySoftLimit);
            Ok(())
        }
        KeyEvent::HardLimit => {
            notifier.raise(ssrc, SrtpEvent::KeyHardLimit);
            Err(SrtpError::KeyExpired)
        }
        KeyEvent::Expired => Err(SrtpError::KeyExpired),
    }
}

fn estimate(stream: &StreamContext, seq: u16) -> Result<IndexEstimate, SrtpError> {
    match stream.pending_roc {
        Some(roc) => stream.rtp_rdbx.estimate_with_roc(roc, seq),
        None => Ok(stream.rtp_rdbx.estimate(seq)),
    }
}

/// Picks the index for an outgoing packet and records it.
fn advance_sender_index(
    stream: &mut StreamContext,
    seq: u16,
    notifier: &Notifier<'_>,
) -> Result<u64, SrtpError> {
    let est = estimate(stream, seq)?;
    if est.index() > MAX_PACKET_INDEX {
        notifier.raise(stream.ssrc, SrtpEvent::PacketIndexLimit);
        return Err(SrtpError::KeyExpired);
    }
    if let IndexEstimate::Near { delta, .. } = est {
        match stream.rtp_rdbx.check(delta) {
            Err(SrtpError::ReplayFail) if stream.allow_repeat_tx => {}
            other => other?,
        }
    }
    commit_index(stream, est)?;
    Ok(est.index())
}

/// Index of an incoming packet, checked against the replay window but not
/// recorded.
fn receiver_estimate(stream: &StreamContext, seq: u16) -> Result<IndexEstimate, SrtpError> {
    let est = estimate(stream, seq)?;
    if let IndexEstimate::Near { delta, .. } = est {
        stream.rtp_rdbx.check(delta)?;
    }
    Ok(est)
}

fn commit_index(stream: &mut StreamContext, est: IndexEstimate) -> Result<(), SrtpError> {
    match est {
        IndexEstimate::Advanced { index } => {
            stream.rtp_rdbx.set_roc_seq((index >> 16) as u32, index as u16)?;
            stream.rtp_rdbx.add_index(0)?;
        }
        IndexEstimate::Near { delta, .. } => stream.rtp_rdbx.add_index(delta)?,
    }
    stream.pending_roc = None;
    Ok(())
}

/// Keystream the MAC asks for ahead of the payload (empty for HMAC).
fn auth_prefix(keys: &mut SessionKeys) -> Result<Vec<u8>, SrtpError> {
    let mut prefix = vec![0u8; keys.rtp_auth.prefix_len()];
    if !prefix.is_empty() {
        keys.rtp_cipher.output(&mut prefix)?;
    }
    Ok(prefix)
}

/// HMAC over the authenticated portion followed by the 32-bit ROC.
fn rtp_tag(
    keys: &mut SessionKeys,
    authenticated: &[u8],
    index: u64,
    prefix: &[u8],
) -> Result<Vec<u8>, SrtpError> {
    let mut roc = [0u8; 4];
    BigEndian::write_u32(&mut roc, (index >> 16) as u32);
    let auth = keys.rtp_auth.as_mut();
    let mut tag = vec![0u8; auth.tag_len()];
    let n = prefix.len().min(tag.len());
    tag[..n].copy_from_slice(&prefix[..n]);
    auth.start()?;
    auth.update(authenticated)?;
    auth.compute(&roc, &mut tag)?;
    Ok(tag)
}

/// Applies the RFC 6904 keystream to the header extension, if the stream
/// encrypts one and the packet carries one.
fn crypt_header_extension(
    keys: &mut SessionKeys,
    ids: &[u8],
    packet: &mut [u8],
    hdr: &RtpHeaderLayout,
    index: u64,
) -> Result<(), SrtpError> {
    let (Some(start), Some(xtn)) = (hdr.ext_start, keys.rtp_xtn_hdr_cipher.as_mut()) else {
        return Ok(());
    };
    let iv = rtp_iv(xtn.cipher_type(), hdr.ssrc, index);
    xtn.set_iv(&iv, CipherDirection::Encrypt)?;
    header_extension::process(&mut packet[start..hdr.header_len], xtn.as_mut(), ids)
}

/// Counter-mode (or null) encryption plus HMAC: `[payload][MKI][tag]`.
fn seal(
    keys: &mut SessionKeys,
    services: SecurityServices,
    xtn_ids: &[u8],
    packet: &mut Vec<u8>,
    hdr: &RtpHeaderLayout,
    index: u64,
    use_mki: bool,
) -> Result<(), SrtpError> {
    let iv = rtp_iv(keys.rtp_cipher.cipher_type(), hdr.ssrc, index);
    keys.rtp_cipher.set_iv(&iv, CipherDirection::Encrypt)?;
    let prefix = if services.authentication() {
        auth_prefix(keys)?
    } else {
        Vec::new()
    };

    crypt_header_extension(keys, xtn_ids, packet, hdr, index)?;
    if services.confidentiality() {
        keys.rtp_cipher.encrypt(&mut packet[hdr.header_len..])?;
    }

    let tag = if services.authentication() {
        Some(rtp_tag(keys, packet, index, &prefix)?)
    } else {
        None
    };
    if use_mki {
        packet.extend_from_slice(&keys.mki_id);
    }
    if let Some(tag) = tag {
        packet.extend_from_slice(&tag);
    }
    Ok(())
}

/// RFC 7714 AEAD: the header is associated data, `[ciphertext][tag][MKI]`.
fn seal_aead(
    keys: &mut SessionKeys,
    xtn_ids: &[u8],
    packet: &mut Vec<u8>,
    hdr: &RtpHeaderLayout,
    index: u64,
    use_mki: bool,
) -> Result<(), SrtpError> {
    let iv = rtp_aead_iv(keys.aead_salt(), hdr.ssrc, index);
    keys.rtp_cipher.set_iv(&iv, CipherDirection::Encrypt)?;
    crypt_header_extension(keys, xtn_ids, packet, hdr, index)?;

    keys.rtp_cipher.set_aad(&packet[..hdr.header_len])?;
    keys.rtp_cipher.encrypt(&mut packet[hdr.header_len..])?;

    let mut tag = vec![0u8; keys.rtp_cipher.tag_len()];
    let n = keys.rtp_cipher.get_tag(&mut tag)?;
    packet.extend_from_slice(&tag[..n]);
    if use_mki {
        packet.extend_from_slice(&keys.mki_id);
    }
    Ok(())
}

/// Inverse of [`seal`]. Returns the length of the recovered RTP packet.
#[allow(clippy::too_many_arguments)]
fn open(
    keys: &mut SessionKeys,
    services: SecurityServices,
    xtn_ids: &[u8],
    packet: &mut [u8],
    hdr: &RtpHeaderLayout,
    index: u64,
    mki_len: usize,
    notifier: &Notifier<'_>,
) -> Result<usize, SrtpError> {
    let tag_len = if services.authentication() {
        keys.rtp_auth.tag_len()
    } else {
        0
    };
    let len = packet.len();
    if len < hdr.header_len + tag_len + mki_len {
        return Err(SrtpError::BadParam);
    }
    let payload_end = len - tag_len - mki_len;

    let iv = rtp_iv(keys.rtp_cipher.cipher_type(), hdr.ssrc, index);
    keys.rtp_cipher.set_iv(&iv, CipherDirection::Decrypt)?;

    if tag_len > 0 {
        let prefix = auth_prefix(keys)?;
        let expected = rtp_tag(keys, &packet[..payload_end], index, &prefix)?;
        if !constant_time_eq(&expected, &packet[len - tag_len..]) {
            return Err(SrtpError::AuthFail);
        }
    }

    charge_key(keys, hdr.ssrc, notifier)?;

    crypt_header_extension(keys, xtn_ids, packet, hdr, index)?;
    if services.confidentiality() {
        keys.rtp_cipher.decrypt(&mut packet[hdr.header_len..payload_end])?;
    }
    Ok(payload_end)
}

/// Inverse of [`seal_aead`]. Returns the length of the recovered RTP packet.
fn open_aead(
    keys: &mut SessionKeys,
    xtn_ids: &[u8],
    packet: &mut [u8],
    hdr: &RtpHeaderLayout,
    index: u64,
    mki_len: usize,
    notifier: &Notifier<'_>,
) -> Result<usize, SrtpError> {
    let tag_len = keys.rtp_cipher.tag_len();
    let ct_end = packet
        .len()
        .checked_sub(mki_len)
        .filter(|&end| end >= hdr.header_len + tag_len)
        .ok_or(SrtpError::BadParam)?;

    let iv = rtp_aead_iv(keys.aead_salt(), hdr.ssrc, index);
    keys.rtp_cipher.set_iv(&iv, CipherDirection::Decrypt)?;

    keys.rtp_cipher.set_aad(&packet[..hdr.header_len])?;
    let plain = keys.rtp_cipher.decrypt(&mut packet[hdr.header_len..ct_end])?;
    charge_key(keys, hdr.ssrc, notifier)?;
    crypt_header_extension(keys, xtn_ids, packet, hdr, index)?;
    Ok(hdr.header_len + plain)
}

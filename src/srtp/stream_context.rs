use crate::srtp::constants::{DEFAULT_REPLAY_WINDOW_SIZE, SRTCP_TRAILER_LEN};
use crate::srtp::crypto_policy::SecurityServices;
use crate::srtp::policy::Policy;
use crate::srtp::replay_window::ReplayWindow;
use crate::srtp::rtcp_replay_window::RtcpReplayWindow;
use crate::srtp::session_keys::SessionKeys;
use crate::srtp::srtp_error::SrtpError;

/// Role a stream has been used in. Assigned on first use; using a stream
/// in the other role is an SSRC collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Unknown,
    Sender,
    Receiver,
}

/// Per-SSRC state.
#[derive(Clone)]
pub struct StreamContext {
    pub(crate) ssrc: u32,
    pub(crate) session_keys: Vec<SessionKeys>,
    pub(crate) rtp_rdbx: ReplayWindow,
    pub(crate) rtcp_rdb: RtcpReplayWindow,
    pub(crate) rtp_services: SecurityServices,
    pub(crate) rtcp_services: SecurityServices,
    pub(crate) direction: Direction,
    pub(crate) allow_repeat_tx: bool,
    pub(crate) enc_xtn_hdr: Vec<u8>,
    /// ROC supplied out of band, used for the next index estimate.
    pub(crate) pending_roc: Option<u32>,
    /// Created from the wildcard template rather than its own policy.
    pub(crate) from_template: bool,
}

impl StreamContext {
    pub(crate) fn new(policy: &Policy) -> Result<Self, SrtpError> {
        policy.validate()?;
        let window_size = match policy.window_size {
            0 => DEFAULT_REPLAY_WINDOW_SIZE,
            n => n,
        };
        let session_keys = policy
            .keys
            .iter()
            .map(|k| SessionKeys::new(policy, k))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ssrc: policy.ssrc.value,
            session_keys,
            rtp_rdbx: ReplayWindow::new(window_size, 0)?,
            rtcp_rdb: RtcpReplayWindow::new(),
            rtp_services: policy.rtp.sec_serv,
            rtcp_services: policy.rtcp.sec_serv,
            direction: Direction::Unknown,
            allow_repeat_tx: policy.allow_repeat_tx,
            enc_xtn_hdr: policy.enc_xtn_hdr.clone(),
            pending_roc: None,
            from_template: false,
        })
    }

    /// New stream for `ssrc` keyed like this template, with fresh replay
    /// state. Key usage limits stay shared with the template.
    pub(crate) fn clone_for(&self, ssrc: u32) -> Result<Self, SrtpError> {
        let mut s = self.clone();
        s.ssrc = ssrc;
        s.rtp_rdbx = ReplayWindow::new(self.rtp_rdbx.window_size(), 0)?;
        s.rtcp_rdb = RtcpReplayWindow::new();
        s.pending_roc = None;
        s.from_template = true;
        Ok(s)
    }

    /// Takes `role` on first use. Returns false when the stream already
    /// plays the other role.
    pub(crate) fn claim_direction(&mut self, role: Direction) -> bool {
        match self.direction {
            Direction::Unknown => {
                self.direction = role;
                true
            }
            current => current == role,
        }
    }

    pub(crate) fn key_index_for_protect(&self, use_mki: bool, mki_index: usize) -> Result<usize, SrtpError> {
        if !use_mki {
            return Ok(0);
        }
        if mki_index >= self.session_keys.len() {
            return Err(SrtpError::BadMki);
        }
        Ok(mki_index)
    }

    /// Picks the session key whose MKI sits `tag_len` bytes before the end
    /// of `packet`.
    pub(crate) fn key_index_for_unprotect(
        &self,
        packet: &[u8],
        use_mki: bool,
        tag_len: usize,
    ) -> Result<usize, SrtpError> {
        if !use_mki {
            return Ok(0);
        }
        let Some(mki_end) = packet.len().checked_sub(tag_len) else {
            return Err(SrtpError::BadMki);
        };
        self.session_keys
            .iter()
            .position(|k| {
                let size = k.mki_size();
                size != 0 && size <= mki_end && packet[mki_end - size..mki_end] == k.mki_id[..]
            })
            .ok_or(SrtpError::BadMki)
    }

    /// Length of the separate RTP MAC tag; AEAD tags sit inside the
    /// ciphertext and do not count.
    pub(crate) fn rtp_auth_tag_len(&self) -> usize {
        match self.session_keys.first() {
            Some(k) if !k.rtp_is_aead() && self.rtp_services.authentication() => k.rtp_auth.tag_len(),
            _ => 0,
        }
    }

    pub(crate) fn rtcp_auth_tag_len(&self) -> usize {
        match self.session_keys.first() {
            Some(k) if !k.rtcp_is_aead() => k.rtcp_auth.tag_len(),
            _ => 0,
        }
    }

    pub(crate) fn trailer_length(&self, rtp: bool, use_mki: bool, mki_index: usize) -> Result<usize, SrtpError> {
        let mut len = 0;
        if use_mki {
            let keys = self.session_keys.get(mki_index).ok_or(SrtpError::BadMki)?;
            len += keys.mki_size();
        }
        let keys = self.session_keys.first().ok_or(SrtpError::BadParam)?;
        if rtp {
            len += keys.rtp_auth.tag_len();
        } else {
            len += keys.rtcp_auth.tag_len() + SRTCP_TRAILER_LEN;
        }
        Ok(len)
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Committed RTP rollover counter.
    pub fn roc(&self) -> u32 {
        self.rtp_rdbx.roc()
    }

    /// Highest extended RTP index accepted so far.
    pub fn packet_index(&self) -> u64 {
        self.rtp_rdbx.packet_index()
    }

    /// Last SRTCP index sent or the start of the receive window.
    pub fn rtcp_index(&self) -> u32 {
        self.rtcp_rdb.value()
    }

    pub fn window_size(&self) -> usize {
        self.rtp_rdbx.window_size()
    }

    pub fn num_master_keys(&self) -> usize {
        self.session_keys.len()
    }

    pub fn is_from_template(&self) -> bool {
        self.from_template
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::srtp::crypto_policy::CryptoPolicy;
    use crate::srtp::master_key::MasterKey;
    use crate::srtp::policy::Ssrc;

    fn stream() -> StreamContext {
        let policy = Policy::new(
            Ssrc::specific(9),
            CryptoPolicy::rtp_default(),
            CryptoPolicy::aes_cm_128_hmac_sha1_32(),
            MasterKey::with_mki(vec![1u8; 30], vec![0xa1]),
        )
        .with_keys(vec![
            MasterKey::with_mki(vec![1u8; 30], vec![0xa1]),
            MasterKey::with_mki(vec![2u8; 30], vec![0xb1, 0xb2]),
        ]);
        StreamContext::new(&policy).unwrap()
    }

    #[test]
    fn default_window_is_128() {
        let s = stream();
        assert_eq!(s.window_size(), 128);
        assert_eq!(s.direction(), Direction::Unknown);
        assert_eq!(s.num_master_keys(), 2);
    }

    #[test]
    fn mki_lookup_from_packet_tail() {
        let s = stream();
        let mut pkt = vec![0u8; 20];
        pkt.extend_from_slice(&[0xb1, 0xb2]);
        pkt.extend_from_slice(&[0xee; 10]);
        assert_eq!(s.key_index_for_unprotect(&pkt, true, 10).unwrap(), 1);

        pkt[20] = 0x00;
        assert_eq!(
            s.key_index_for_unprotect(&pkt, true, 10),
            Err(SrtpError::BadMki)
        );
        assert_eq!(s.key_index_for_unprotect(&pkt, false, 10).unwrap(), 0);
    }

    #[test]
    fn direction_is_claimed_once() {
        let mut s = stream();
        assert!(s.claim_direction(Direction::Receiver));
        assert!(s.claim_direction(Direction::Receiver));
        assert!(!s.claim_direction(Direction::Sender));
        assert_eq!(s.direction(), Direction::Receiver);
    }

    #[test]
    fn protect_mki_index_bounds() {
        let s = stream();
        assert_eq!(s.key_index_for_protect(true, 1).unwrap(), 1);
        assert_eq!(s.key_index_for_protect(true, 2), Err(SrtpError::BadMki));
        assert_eq!(s.key_index_for_protect(false, 7).unwrap(), 0);
    }

    #[test]
    fn trailer_lengths() {
        let s = stream();
        assert_eq!(s.trailer_length(true, false, 0).unwrap(), 10);
        assert_eq!(s.trailer_length(true, true, 1).unwrap(), 12);
        assert_eq!(s.trailer_length(false, true, 0).unwrap(), 4 + 4 + 1);
        assert_eq!(s.trailer_length(true, true, 5), Err(SrtpError::BadMki));
    }

    #[test]
    fn clones_start_with_fresh_replay_state() {
        let mut s = stream();
        s.rtp_rdbx.add_index(5).unwrap();
        s.pending_roc = Some(3);
        let c = s.clone_for(77).unwrap();
        assert_eq!(c.ssrc(), 77);
        assert_eq!(c.packet_index(), 0);
        assert_eq!(c.pending_roc, None);
        assert!(c.is_from_template());
        assert!(!s.is_from_template());
    }
}

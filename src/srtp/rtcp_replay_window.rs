use crate::srtp::constants::{RTCP_REPLAY_WINDOW_BITS, SRTCP_MAX_INDEX};
use crate::srtp::srtp_error::SrtpError;

/// SRTCP replay database: a 128-bit bitmap anchored at `window_start`.
/// Bit `i` records index `window_start + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcpReplayWindow {
    window_start: u32,
    bitmask: u128,
}

impl RtcpReplayWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last index handed out by [`increment`](Self::increment).
    pub fn value(&self) -> u32 {
        self.window_start
    }

    pub fn check(&self, index: u32) -> Result<(), SrtpError> {
        if u64::from(index) >= u64::from(self.window_start) + u64::from(RTCP_REPLAY_WINDOW_BITS) {
            return Ok(());
        }
        if index < self.window_start {
            return Err(SrtpError::ReplayOld);
        }
        if (self.bitmask >> (index - self.window_start)) & 1 == 1 {
            return Err(SrtpError::ReplayFail);
        }
        Ok(())
    }

    pub fn add_index(&mut self, index: u32) -> Result<(), SrtpError> {
        if index < self.window_start {
            return Err(SrtpError::ReplayFail);
        }
        let delta = index - self.window_start;
        if delta < RTCP_REPLAY_WINDOW_BITS {
            self.bitmask |= 1 << delta;
        } else {
            let shift = delta - (RTCP_REPLAY_WINDOW_BITS - 1);
            self.bitmask = if shift >= RTCP_REPLAY_WINDOW_BITS {
                0
            } else {
                self.bitmask >> shift
            };
            self.bitmask |= 1 << (RTCP_REPLAY_WINDOW_BITS - 1);
            self.window_start += shift;
        }
        Ok(())
    }

    /// Advances the sender-side index; fails once the 31-bit space is used up.
    pub fn increment(&mut self) -> Result<u32, SrtpError> {
        if self.window_start >= SRTCP_MAX_INDEX {
            return Err(SrtpError::KeyExpired);
        }
        self.window_start += 1;
        Ok(self.window_start)
    }
}

use crate::srtp::constants::{
    MAX_REPLAY_WINDOW_SIZE, MIN_REPLAY_WINDOW_SIZE, SEQ_NUM_MAX, SEQ_NUM_MEDIAN,
};
use crate::srtp::srtp_error::SrtpError;

/// Fixed-length bit vector. Bit `len - 1` is the newest slot of the window;
/// shifting moves bits toward index 0 and drops the oldest ones.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BitVector {
    len: usize,
    words: Vec<u64>,
}

impl BitVector {
    fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(64)],
        }
    }

    fn get(&self, i: usize) -> bool {
        i < self.len && (self.words[i / 64] >> (i % 64)) & 1 == 1
    }

    fn set(&mut self, i: usize) {
        if i < self.len {
            self.words[i / 64] |= 1 << (i % 64);
        }
    }

    fn clear(&mut self) {
        self.words.fill(0);
    }

    fn shift_left(&mut self, n: usize) {
        if n >= self.len {
            self.clear();
            return;
        }
        let word_shift = n / 64;
        let bit_shift = n % 64;
        let count = self.words.len();
        for k in 0..count {
            let src = k + word_shift;
            let mut w = if src < count { self.words[src] >> bit_shift } else { 0 };
            if bit_shift > 0 && src + 1 < count {
                w |= self.words[src + 1] << (64 - bit_shift);
            }
            self.words[k] = w;
        }
    }
}

/// Outcome of mapping a 16-bit sequence number onto the extended index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEstimate {
    /// Index near the window; `delta` is its distance from the newest index.
    Near { index: u64, delta: i32 },
    /// Index far ahead of the window. The caller resynchronizes ROC/seq
    /// before committing it.
    Advanced { index: u64 },
}

impl IndexEstimate {
    pub fn index(&self) -> u64 {
        match self {
            IndexEstimate::Near { index, .. } | IndexEstimate::Advanced { index } => *index,
        }
    }
}

/// RTP replay database: the highest extended index seen (`ROC << 16 | SEQ`)
/// and a bitmap of the packets received just before it (RFC 3711 §3.3.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayWindow {
    index: u64,
    bitmask: BitVector,
}

impl ReplayWindow {
    /// `window_size` is rounded up to a multiple of 32.
    pub fn new(window_size: usize, index: u64) -> Result<Self, SrtpError> {
        if window_size == 0 {
            return Err(SrtpError::BadParam);
        }
        Ok(Self {
            index,
            bitmask: BitVector::new(window_size.div_ceil(32) * 32),
        })
    }

    /// Validates a stream's configured window size; 0 selects the default.
    pub fn valid_size(window_size: usize) -> bool {
        window_size == 0 || (MIN_REPLAY_WINDOW_SIZE..MAX_REPLAY_WINDOW_SIZE).contains(&window_size)
    }

    pub fn window_size(&self) -> usize {
        self.bitmask.len
    }

    pub fn packet_index(&self) -> u64 {
        self.index
    }

    pub fn roc(&self) -> u32 {
        (self.index >> 16) as u32
    }

    /// Best guess of the extended index of `seq` relative to the newest
    /// index (RFC 3711 Appendix A).
    pub fn estimate(&self, seq: u16) -> IndexEstimate {
        if self.index <= SEQ_NUM_MEDIAN {
            let delta = i32::from(seq) - (self.index & 0xffff) as i32;
            return IndexEstimate::Near {
                index: u64::from(seq),
                delta,
            };
        }

        let local_roc = self.index >> 16;
        let local_seq = (self.index & 0xffff) as i64;
        let s = i64::from(seq);
        let median = SEQ_NUM_MEDIAN as i64;
        let max = SEQ_NUM_MAX as i64;

        let (roc, delta) = if local_seq < median {
            if s - local_seq > median {
                (local_roc - 1, s - local_seq - max)
            } else {
                (local_roc, s - local_seq)
            }
        } else if local_seq - median > s {
            (local_roc + 1, s - local_seq + max)
        } else {
            (local_roc, s - local_seq)
        };

        IndexEstimate::Near {
            index: (roc << 16) | u64::from(seq),
            delta: delta as i32,
        }
    }

    /// Estimate using a ROC learned out of band instead of the local one.
    pub fn estimate_with_roc(&self, roc: u32, seq: u16) -> Result<IndexEstimate, SrtpError> {
        let index = (u64::from(roc) << 16) | u64::from(seq);
        if index > self.index && index - self.index > SEQ_NUM_MEDIAN {
            return Ok(IndexEstimate::Advanced { index });
        }
        if index < self.index && self.index - index > SEQ_NUM_MEDIAN {
            return Err(SrtpError::PktIdxOld);
        }
        Ok(IndexEstimate::Near {
            index,
            delta: (index as i64 - self.index as i64) as i32,
        })
    }

    /// Checks the index `delta` away from the newest index without
    /// recording it.
    pub fn check(&self, delta: i32) -> Result<(), SrtpError> {
        if delta > 0 {
            return Ok(());
        }
        let slot = self.window_size() as i64 - 1 + i64::from(delta);
        if slot < 0 {
            return Err(SrtpError::ReplayOld);
        }
        if self.bitmask.get(slot as usize) {
            return Err(SrtpError::ReplayFail);
        }
        Ok(())
    }

    /// Records the index `delta` away from the newest index, sliding the
    /// window forward when it is newer.
    pub fn add_index(&mut self, delta: i32) -> Result<(), SrtpError> {
        let newest = self.window_size() - 1;
        if delta > 0 {
            self.index += delta as u64;
            self.bitmask.shift_left(delta as usize);
            self.bitmask.set(newest);
        } else {
            let slot = newest as i64 + i64::from(delta);
            if slot < 0 {
                return Err(SrtpError::ReplayOld);
            }
            self.bitmask.set(slot as usize);
        }
        Ok(())
    }

    /// Moves the ROC forward, keeping the sequence number.
    pub fn set_roc(&mut self, roc: u32) -> Result<(), SrtpError> {
        if roc < self.roc() {
            return Err(SrtpError::ReplayOld);
        }
        self.index = (u64::from(roc) << 16) | (self.index & 0xffff);
        self.bitmask.clear();
        Ok(())
    }

    pub fn set_roc_seq(&mut self, roc: u32, seq: u16) -> Result<(), SrtpError> {
        if roc < self.roc() {
            return Err(SrtpError::ReplayOld);
        }
        self.index = (u64::from(roc) << 16) | u64::from(seq);
        self.bitmask.clear();
        Ok(())
    }
}

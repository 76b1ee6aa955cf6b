use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

const STATE_NORMAL: u8 = 0;
const STATE_PAST_SOFT: u8 = 1;
const STATE_EXPIRED: u8 = 2;

/// Result of charging one packet against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Normal,
    /// First use inside the soft margin.
    SoftLimit,
    /// The use that exhausted the key.
    HardLimit,
    /// Key was already exhausted before this use.
    Expired,
}

/// Usage budget of one master key.
///
/// Shared (through `Arc`) between a template and every stream cloned from
/// it, so all of them draw from the same budget.
#[derive(Debug)]
pub struct KeyLimit {
    num_left: AtomicU64,
    soft_limit: u64,
    state: AtomicU8,
}

impl KeyLimit {
    pub fn new(limit: u64, soft_limit: u64) -> Self {
        let state = if limit == 0 { STATE_EXPIRED } else { STATE_NORMAL };
        Self {
            num_left: AtomicU64::new(limit),
            soft_limit,
            state: AtomicU8::new(state),
        }
    }

    pub fn update(&self) -> KeyEvent {
        if self.state.load(Ordering::Acquire) == STATE_EXPIRED {
            return KeyEvent::Expired;
        }
        let left = match self
            .num_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(prev) => prev - 1,
            Err(_) => {
                self.state.store(STATE_EXPIRED, Ordering::Release);
                return KeyEvent::Expired;
            }
        };

        if left >= self.soft_limit && left > 0 {
            return KeyEvent::Normal;
        }
        if left == 0 {
            self.state.store(STATE_EXPIRED, Ordering::Release);
            return KeyEvent::HardLimit;
        }
        match self.state.compare_exchange(
            STATE_NORMAL,
            STATE_PAST_SOFT,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => KeyEvent::SoftLimit,
            Err(_) => KeyEvent::Normal,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.num_left.load(Ordering::Acquire)
    }

    pub fn is_expired(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_EXPIRED
    }
}

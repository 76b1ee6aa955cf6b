use std::fmt;

/// Stream lifecycle conditions reported out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrtpEvent {
    /// A stream was used for both protect and unprotect.
    SsrcCollision,
    KeySoftLimit,
    KeyHardLimit,
    /// The packet index space of the stream is exhausted.
    PacketIndexLimit,
}

impl fmt::Display for SrtpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SrtpEvent::*;
        match self {
            SsrcCollision => write!(f, "ssrc collision"),
            KeySoftLimit => write!(f, "key usage soft limit reached"),
            KeyHardLimit => write!(f, "key usage hard limit reached"),
            PacketIndexLimit => write!(f, "packet index limit reached"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrtpEventData {
    pub ssrc: u32,
    pub event: SrtpEvent,
}

/// Session-wide event handler. Installed once, applies to every call.
pub trait EventSink: Send + Sync {
    fn on_event(&self, data: &SrtpEventData);
}

impl<F> EventSink for F
where
    F: Fn(&SrtpEventData) + Send + Sync,
{
    fn on_event(&self, data: &SrtpEventData) {
        self(data)
    }
}

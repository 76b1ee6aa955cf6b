use std::fmt;

/// Failure kinds reported by the SRTP engine.
///
/// Replay and authentication failures never mutate stream state, so a caller
/// can drop the offending packet and keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrtpError {
    /// Malformed header, bad window size, disallowed MKI length, bad policy.
    BadParam,
    AllocFail,
    /// A cipher or MAC could not be keyed.
    InitFail,
    /// Tag mismatch.
    AuthFail,
    /// Primitive-level failure.
    CipherFail,
    /// Index already seen.
    ReplayFail,
    /// Index behind the replay window.
    ReplayOld,
    /// Index too far behind the pending ROC estimate.
    PktIdxOld,
    /// ROC jump detected; the caller resynchronizes before continuing.
    PktIdxAdv,
    /// Hard key usage limit (or index space) exhausted.
    KeyExpired,
    /// No session key matches the MKI.
    BadMki,
    /// No stream and no template for the SSRC.
    NoCtx,
    /// Header extension overruns its declared length.
    ParseErr,
    /// SRTCP E-bit disagrees with the configured RTCP services.
    CantCheck,
    /// Policy could not be built from configuration.
    Config(String),
}

impl fmt::Display for SrtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SrtpError::*;
        match self {
            BadParam => write!(f, "bad parameter"),
            AllocFail => write!(f, "allocation failed"),
            InitFail => write!(f, "cipher or auth initialization failed"),
            AuthFail => write!(f, "authentication failed"),
            CipherFail => write!(f, "cipher operation failed"),
            ReplayFail => write!(f, "replayed packet index"),
            ReplayOld => write!(f, "packet index too old for replay window"),
            PktIdxOld => write!(f, "packet index too far behind estimate"),
            PktIdxAdv => write!(f, "packet index advanced past estimate"),
            KeyExpired => write!(f, "key usage limit reached"),
            BadMki => write!(f, "no session key for MKI"),
            NoCtx => write!(f, "no stream context for SSRC"),
            ParseErr => write!(f, "malformed header extension"),
            CantCheck => write!(f, "SRTCP encryption flag does not match policy"),
            Config(msg) => write!(f, "policy config error: {msg}"),
        }
    }
}

impl std::error::Error for SrtpError {}

impl From<hex::FromHexError> for SrtpError {
    fn from(e: hex::FromHexError) -> Self {
        SrtpError::Config(format!("invalid hex key: {e}"))
    }
}

impl From<std::num::ParseIntError> for SrtpError {
    fn from(e: std::num::ParseIntError) -> Self {
        SrtpError::Config(format!("invalid number: {e}"))
    }
}

//! RustySRTP protects and verifies RTP and RTCP packets (SRTP / SRTCP).
//!
//! A [`SrtpSession`](srtp::SrtpSession) holds one stream context per SSRC,
//! plus an optional wildcard template that is cloned for new SSRCs. Packets
//! are transformed in place: `protect` encrypts and appends the
//! authentication trailer, `unprotect` verifies and strips it.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rustysrtp::log::NoopLogSink;
//! use rustysrtp::srtp::{CryptoPolicy, MasterKey, Policy, Ssrc, SrtpSession};
//!
//! let policy = Policy::new(
//!     Ssrc::any_outbound(),
//!     CryptoPolicy::rtp_default(),
//!     CryptoPolicy::rtcp_default(),
//!     MasterKey::random(30),
//! );
//! let mut tx = SrtpSession::create(&[policy], Arc::new(NoopLogSink))?;
//! tx.protect(&mut rtp_packet)?;
//! ```

/// INI configuration loading.
pub mod config;
/// Leveled logging sinks and macros.
pub mod log;
/// The SRTP / SRTCP engine.
pub mod srtp;

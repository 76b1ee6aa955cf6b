//! Secure RTP / RTCP (RFC 3711, RFC 6188, RFC 6904, RFC 7714).

pub mod auth;
pub mod cipher;
pub mod constants;
pub mod crypto_policy;
pub mod event;
pub(crate) mod header_extension;
pub(crate) mod kdf;
pub mod key_limit;
pub mod master_key;
pub mod policy;
pub mod policy_config;
pub mod replay_window;
pub mod rtcp_replay_window;
pub(crate) mod rtp_header_layout;
pub mod session_keys;
pub mod srtcp_context;
pub mod srtp_context;
pub mod srtp_endpoint_keys;
pub mod srtp_error;
pub mod srtp_profile;
pub mod srtp_session;
pub mod srtp_session_config;
pub mod stream_context;
mod utils;

pub use auth::AuthType;
pub use cipher::CipherType;
pub use crypto_policy::{CryptoPolicy, SecurityServices};
pub use event::{EventSink, SrtpEvent, SrtpEventData};
pub use master_key::MasterKey;
pub use policy::{Policy, Ssrc, SsrcType};
pub use policy_config::policies_from_config;
pub use srtp_endpoint_keys::SrtpEndpointKeys;
pub use srtp_error::SrtpError;
pub use srtp_profile::SrtpProfile;
pub use srtp_session::SrtpSession;
pub use srtp_session_config::{KeyingRole, SrtpSessionConfig};
pub use stream_context::{Direction, StreamContext};

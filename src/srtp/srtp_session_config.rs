use std::sync::Arc;

use crate::log::log_sink::LogSink;
use crate::srtp::policy::{Policy, Ssrc};
use crate::srtp::srtp_endpoint_keys::SrtpEndpointKeys;
use crate::srtp::srtp_error::SrtpError;
use crate::srtp::srtp_profile::SrtpProfile;
use crate::srtp::srtp_session::SrtpSession;

/// Side of the DTLS handshake that exported the keying material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyingRole {
    Client,
    Server,
}

/// Keys and profile agreed by a DTLS-SRTP handshake.
#[derive(Debug, Clone)]
pub struct SrtpSessionConfig {
    pub profile: SrtpProfile,
    pub outbound: SrtpEndpointKeys,
    pub inbound: SrtpEndpointKeys,
}

impl SrtpSessionConfig {
    /// Splits exported keying material laid out as
    /// `client_key || server_key || client_salt || server_salt` (RFC 5764 §4.2).
    pub fn from_keying_material(
        profile: SrtpProfile,
        material: &[u8],
        role: KeyingRole,
    ) -> Result<Self, SrtpError> {
        let key_len = profile.master_key_len();
        let salt_len = profile.master_salt_len();
        if material.len() != 2 * (key_len + salt_len) {
            return Err(SrtpError::BadParam);
        }

        let (client_key, rest) = material.split_at(key_len);
        let (server_key, rest) = rest.split_at(key_len);
        let (client_salt, server_salt) = rest.split_at(salt_len);

        let client_keys = SrtpEndpointKeys::new(client_key, client_salt);
        let server_keys = SrtpEndpointKeys::new(server_key, server_salt);

        let (outbound, inbound) = match role {
            KeyingRole::Client => (client_keys, server_keys),
            KeyingRole::Server => (server_keys, client_keys),
        };

        Ok(Self {
            profile,
            outbound,
            inbound,
        })
    }

    /// Template policy protecting everything this endpoint sends.
    pub fn outbound_policy(&self) -> Result<Policy, SrtpError> {
        self.policy(Ssrc::any_outbound(), &self.outbound)
    }

    /// Template policy for everything the peer sends.
    pub fn inbound_policy(&self) -> Result<Policy, SrtpError> {
        self.policy(Ssrc::any_inbound(), &self.inbound)
    }

    /// `(outbound, inbound)` sessions sharing `logger`.
    pub fn sessions(&self, logger: Arc<dyn LogSink>) -> Result<(SrtpSession, SrtpSession), SrtpError> {
        let tx = SrtpSession::create(&[self.outbound_policy()?], logger.clone())?;
        let rx = SrtpSession::create(&[self.inbound_policy()?], logger)?;
        Ok((tx, rx))
    }

    fn policy(&self, ssrc: Ssrc, keys: &SrtpEndpointKeys) -> Result<Policy, SrtpError> {
        Ok(Policy::new(
            ssrc,
            self.profile.rtp_policy()?,
            self.profile.rtcp_policy()?,
            keys.to_master_key(self.profile)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use crate::srtp::policy::SsrcType;

    fn material(profile: SrtpProfile) -> Vec<u8> {
        let k = profile.master_key_len();
        let s = profile.master_salt_len();
        let mut m = vec![0xc1u8; k];
        m.extend(vec![0x51u8; k]);
        m.extend(vec![0xc2u8; s]);
        m.extend(vec![0x52u8; s]);
        m
    }

    #[test]
    fn client_sends_with_client_keys() {
        let p = SrtpProfile::Aes128CmHmacSha1_80;
        let cfg = SrtpSessionConfig::from_keying_material(p, &material(p), KeyingRole::Client).unwrap();
        assert_eq!(cfg.outbound.master_key, vec![0xc1u8; 16]);
        assert_eq!(cfg.outbound.master_salt, vec![0xc2u8; 14]);
        assert_eq!(cfg.inbound.master_key, vec![0x51u8; 16]);

        let cfg = SrtpSessionConfig::from_keying_material(p, &material(p), KeyingRole::Server).unwrap();
        assert_eq!(cfg.outbound.master_key, vec![0x51u8; 16]);
        assert_eq!(cfg.inbound.master_salt, vec![0xc2u8; 14]);
    }

    #[test]
    fn rejects_short_material() {
        let p = SrtpProfile::AeadAes256Gcm;
        let mut m = material(p);
        m.pop();
        assert!(SrtpSessionConfig::from_keying_material(p, &m, KeyingRole::Client).is_err());
    }

    #[test]
    fn policies_are_templates() {
        let p = SrtpProfile::AeadAes128Gcm;
        let cfg = SrtpSessionConfig::from_keying_material(p, &material(p), KeyingRole::Client).unwrap();
        assert_eq!(cfg.outbound_policy().unwrap().ssrc.kind, SsrcType::AnyOutbound);
        assert_eq!(cfg.inbound_policy().unwrap().ssrc.kind, SsrcType::AnyInbound);
    }

    #[test]
    fn client_and_server_sessions_interoperate() {
        let p = SrtpProfile::Aes128CmHmacSha1_80;
        let m = material(p);
        let client = SrtpSessionConfig::from_keying_material(p, &m, KeyingRole::Client).unwrap();
        let server = SrtpSessionConfig::from_keying_material(p, &m, KeyingRole::Server).unwrap();
        let (mut client_tx, _) = client.sessions(Arc::new(NoopLogSink)).unwrap();
        let (_, mut server_rx) = server.sessions(Arc::new(NoopLogSink)).unwrap();

        let mut pkt = vec![0x80, 0x60, 0x00, 0x01, 0, 0, 0, 1, 0, 0, 0, 7];
        pkt.extend_from_slice(b"hello");
        let plain = pkt.clone();
        client_tx.protect(&mut pkt).unwrap();
        assert_ne!(pkt, plain);
        server_rx.unprotect(&mut pkt).unwrap();
        assert_eq!(pkt, plain);
    }
}

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::log::log_sink::LogSink;
use crate::srtp::event::{EventSink, SrtpEvent, SrtpEventData};
use crate::srtp::policy::{Policy, SsrcType};
use crate::srtp::policy_config::policies_from_config;
use crate::srtp::replay_window::ReplayWindow;
use crate::srtp::srtp_error::SrtpError;
use crate::srtp::stream_context::{Direction, StreamContext};
use crate::{sink_debug, sink_info, sink_warn};

/// Borrowed view of the session's reporting handles, usable while a stream
/// of the same session is mutably borrowed.
pub(crate) struct Notifier<'a> {
    pub(crate) logger: &'a Arc<dyn LogSink>,
    sink: Option<&'a Arc<dyn EventSink>>,
}

impl Notifier<'_> {
    pub(crate) fn raise(&self, ssrc: u32, event: SrtpEvent) {
        sink_warn!(self.logger, "[SRTP] SSRC={:#x}: {}", ssrc, event);
        if let Some(sink) = self.sink {
            sink.on_event(&SrtpEventData { ssrc, event });
        }
    }
}

/// A set of SRTP streams keyed by SSRC, plus at most one wildcard template
/// that is cloned into a concrete stream the first time an unknown SSRC is
/// seen.
///
/// Calls take `&mut self`; share a session between threads behind a lock.
pub struct SrtpSession {
    pub(crate) logger: Arc<dyn LogSink>,
    pub(crate) streams: HashMap<u32, StreamContext>,
    pub(crate) template: Option<StreamContext>,
    event_sink: Option<Arc<dyn EventSink>>,
    user_data: Option<Box<dyn Any + Send>>,
}

impl SrtpSession {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            logger,
            streams: HashMap::new(),
            template: None,
            event_sink: None,
            user_data: None,
        }
    }

    /// Session with one stream (or template) per policy.
    pub fn create(policies: &[Policy], logger: Arc<dyn LogSink>) -> Result<Self, SrtpError> {
        let mut session = Self::new(logger);
        for policy in policies {
            session.add_stream(policy)?;
        }
        Ok(session)
    }

    /// Session built from the `stream*` sections of an INI config.
    pub fn from_config(config: &Config, logger: Arc<dyn LogSink>) -> Result<Self, SrtpError> {
        let policies = policies_from_config(config)?;
        Self::create(&policies, logger)
    }

    pub fn add_stream(&mut self, policy: &Policy) -> Result<(), SrtpError> {
        let mut stream = StreamContext::new(policy)?;
        match policy.ssrc.kind {
            SsrcType::AnyOutbound | SsrcType::AnyInbound => {
                if self.template.is_some() {
                    sink_warn!(self.logger, "[SRTP] Session already has a template stream");
                    return Err(SrtpError::BadParam);
                }
                stream.direction = if policy.ssrc.kind == SsrcType::AnyOutbound {
                    Direction::Sender
                } else {
                    Direction::Receiver
                };
                sink_debug!(
                    self.logger,
                    "[SRTP] Template stream added ({:?}, {} master keys)",
                    policy.ssrc.kind,
                    stream.num_master_keys()
                );
                self.template = Some(stream);
            }
            SsrcType::Specific => {
                let ssrc = policy.ssrc.value;
                if self.streams.contains_key(&ssrc) {
                    sink_warn!(self.logger, "[SRTP] Stream SSRC={:#x} already exists", ssrc);
                    return Err(SrtpError::BadParam);
                }
                sink_debug!(self.logger, "[SRTP] Stream added SSRC={:#x}", ssrc);
                self.streams.insert(ssrc, stream);
            }
        }
        Ok(())
    }

    /// Drops the stream; its key material is wiped on drop.
    pub fn remove_stream(&mut self, ssrc: u32) -> Result<(), SrtpError> {
        match self.streams.remove(&ssrc) {
            Some(_) => {
                sink_debug!(self.logger, "[SRTP] Stream removed SSRC={:#x}", ssrc);
                Ok(())
            }
            None => Err(SrtpError::NoCtx),
        }
    }

    pub fn update(&mut self, policies: &[Policy]) -> Result<(), SrtpError> {
        for policy in policies {
            self.update_stream(policy)?;
        }
        Ok(())
    }

    /// Re-keys a stream (or the template and every stream cloned from it)
    /// while keeping the RTP packet index and the SRTCP replay state.
    pub fn update_stream(&mut self, policy: &Policy) -> Result<(), SrtpError> {
        match policy.ssrc.kind {
            SsrcType::Specific => self.update_specific(policy),
            SsrcType::AnyInbound | SsrcType::AnyOutbound => self.update_template(policy),
        }
    }

    fn update_specific(&mut self, policy: &Policy) -> Result<(), SrtpError> {
        let ssrc = policy.ssrc.value;
        let old = self.streams.get(&ssrc).ok_or(SrtpError::BadParam)?;
        let mut fresh = StreamContext::new(policy)?;
        carry_replay_state(old, &mut fresh)?;
        self.streams.insert(ssrc, fresh);
        sink_info!(self.logger, "[SRTP] Stream SSRC={:#x} re-keyed", ssrc);
        Ok(())
    }

    fn update_template(&mut self, policy: &Policy) -> Result<(), SrtpError> {
        if self.template.is_none() {
            return Err(SrtpError::BadParam);
        }
        let mut template = StreamContext::new(policy)?;
        template.direction = if policy.ssrc.kind == SsrcType::AnyOutbound {
            Direction::Sender
        } else {
            Direction::Receiver
        };

        let mut replaced = Vec::new();
        for (ssrc, old) in self.streams.iter().filter(|(_, s)| s.from_template) {
            let mut fresh = template.clone_for(*ssrc)?;
            carry_replay_state(old, &mut fresh)?;
            replaced.push((*ssrc, fresh));
        }
        let count = replaced.len();
        self.streams.extend(replaced);
        self.template = Some(template);
        sink_info!(
            self.logger,
            "[SRTP] Template re-keyed, {} derived streams updated",
            count
        );
        Ok(())
    }

    pub fn stream(&self, ssrc: u32) -> Option<&StreamContext> {
        self.streams.get(&ssrc)
    }

    pub fn template(&self) -> Option<&StreamContext> {
        self.template.as_ref()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Stores a rollover counter learned out of band; the next RTP index
    /// estimate for the stream uses it instead of the local one.
    pub fn set_stream_roc(&mut self, ssrc: u32, roc: u32) -> Result<(), SrtpError> {
        let stream = self.streams.get_mut(&ssrc).ok_or(SrtpError::BadParam)?;
        stream.pending_roc = Some(roc);
        sink_debug!(self.logger, "[SRTP] Pending ROC={} for SSRC={:#x}", roc, ssrc);
        Ok(())
    }

    pub fn get_stream_roc(&self, ssrc: u32) -> Result<u32, SrtpError> {
        self.streams
            .get(&ssrc)
            .map(StreamContext::roc)
            .ok_or(SrtpError::BadParam)
    }

    /// Largest number of bytes `protect` may append to an RTP packet.
    pub fn get_protect_trailer_length(&self, use_mki: bool, mki_index: usize) -> Result<usize, SrtpError> {
        self.max_trailer_length(true, use_mki, mki_index)
    }

    /// Largest number of bytes `protect_rtcp` may append to an RTCP packet.
    pub fn get_protect_rtcp_trailer_length(
        &self,
        use_mki: bool,
        mki_index: usize,
    ) -> Result<usize, SrtpError> {
        self.max_trailer_length(false, use_mki, mki_index)
    }

    fn max_trailer_length(&self, rtp: bool, use_mki: bool, mki_index: usize) -> Result<usize, SrtpError> {
        self.template
            .iter()
            .chain(self.streams.values())
            .filter_map(|s| s.trailer_length(rtp, use_mki, mki_index).ok())
            .max()
            .ok_or(SrtpError::BadParam)
    }

    pub fn set_user_data<T: Any + Send>(&mut self, data: T) {
        self.user_data = Some(Box::new(data));
    }

    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_ref()?.downcast_ref::<T>()
    }

    /// Replaces the session-wide event handler; `None` removes it.
    pub fn install_event_handler(&mut self, sink: Option<Arc<dyn EventSink>>) {
        self.event_sink = sink;
    }

    pub fn install_log_handler(&mut self, logger: Arc<dyn LogSink>) {
        self.logger = logger;
    }

    /// Splits the session into the stream for `ssrc` (cloned from the
    /// template and inserted when missing) and its reporting handles.
    /// `force_sender` marks a freshly cloned stream as sending regardless of
    /// the template's direction.
    pub(crate) fn sender_stream(
        &mut self,
        ssrc: u32,
        force_sender: bool,
    ) -> Result<(&mut StreamContext, Notifier<'_>), SrtpError> {
        let Self {
            logger,
            streams,
            template,
            event_sink,
            ..
        } = self;
        let notifier = Notifier {
            logger: &*logger,
            sink: event_sink.as_ref(),
        };
        let stream = match streams.entry(ssrc) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let t = template.as_ref().ok_or(SrtpError::NoCtx)?;
                let mut fresh = t.clone_for(ssrc)?;
                if force_sender {
                    fresh.direction = Direction::Sender;
                }
                sink_debug!(notifier.logger, "[SRTP] New stream SSRC={:#x} from template", ssrc);
                e.insert(fresh)
            }
        };
        Ok((stream, notifier))
    }

    /// Like [`sender_stream`](Self::sender_stream) but never inserts: a
    /// missing SSRC resolves to the template itself, flagged provisional.
    pub(crate) fn receiver_stream(
        &mut self,
        ssrc: u32,
    ) -> Result<(&mut StreamContext, bool, Notifier<'_>), SrtpError> {
        let Self {
            logger,
            streams,
            template,
            event_sink,
            ..
        } = self;
        let notifier = Notifier {
            logger: &*logger,
            sink: event_sink.as_ref(),
        };
        match streams.get_mut(&ssrc) {
            Some(s) => Ok((s, false, notifier)),
            None => match template.as_mut() {
                Some(t) => Ok((t, true, notifier)),
                None => Err(SrtpError::NoCtx),
            },
        }
    }

    /// Inserts the stream cloned from the template for `ssrc` after its
    /// first packet authenticated, and returns it.
    pub(crate) fn promote(&mut self, ssrc: u32) -> Result<&mut StreamContext, SrtpError> {
        let t = self.template.as_ref().ok_or(SrtpError::NoCtx)?;
        let fresh = t.clone_for(ssrc)?;
        sink_debug!(self.logger, "[SRTP] New stream SSRC={:#x} from template", ssrc);
        Ok(self.streams.entry(ssrc).or_insert(fresh))
    }
}

fn carry_replay_state(old: &StreamContext, fresh: &mut StreamContext) -> Result<(), SrtpError> {
    fresh.rtp_rdbx = ReplayWindow::new(fresh.rtp_rdbx.window_size(), old.rtp_rdbx.packet_index())?;
    fresh.rtcp_rdb = old.rtcp_rdb;
    fresh.from_template = old.from_template;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use crate::srtp::crypto_policy::CryptoPolicy;
    use crate::srtp::master_key::MasterKey;
    use crate::srtp::policy::Ssrc;

    fn policy(ssrc: Ssrc) -> Policy {
        Policy::new(
            ssrc,
            CryptoPolicy::rtp_default(),
            CryptoPolicy::rtcp_default(),
            MasterKey::new(vec![3u8; 30]),
        )
    }

    fn session() -> SrtpSession {
        SrtpSession::new(Arc::new(NoopLogSink))
    }

    #[test]
    fn one_template_per_session() {
        let mut s = session();
        s.add_stream(&policy(Ssrc::any_inbound())).unwrap();
        assert_eq!(
            s.add_stream(&policy(Ssrc::any_outbound())),
            Err(SrtpError::BadParam)
        );
        assert_eq!(s.template().unwrap().direction(), Direction::Receiver);
    }

    #[test]
    fn duplicate_ssrc_is_rejected() {
        let mut s = session();
        s.add_stream(&policy(Ssrc::specific(5))).unwrap();
        assert_eq!(
            s.add_stream(&policy(Ssrc::specific(5))),
            Err(SrtpError::BadParam)
        );
    }

    #[test]
    fn remove_unknown_stream() {
        let mut s = session();
        s.add_stream(&policy(Ssrc::specific(5))).unwrap();
        s.remove_stream(5).unwrap();
        assert_eq!(s.remove_stream(5), Err(SrtpError::NoCtx));
        assert_eq!(s.stream_count(), 0);
    }

    #[test]
    fn roc_accessors_need_a_stream() {
        let mut s = session();
        assert_eq!(s.set_stream_roc(1, 2), Err(SrtpError::BadParam));
        assert_eq!(s.get_stream_roc(1), Err(SrtpError::BadParam));
        s.add_stream(&policy(Ssrc::specific(1))).unwrap();
        s.set_stream_roc(1, 2).unwrap();
        assert_eq!(s.stream(1).unwrap().pending_roc, Some(2));
        assert_eq!(s.get_stream_roc(1).unwrap(), 0);
    }

    #[test]
    fn trailer_length_needs_streams() {
        let mut s = session();
        assert_eq!(
            s.get_protect_trailer_length(false, 0),
            Err(SrtpError::BadParam)
        );
        let mut p = policy(Ssrc::specific(1));
        p.rtp = CryptoPolicy::aes_cm_128_hmac_sha1_32();
        s.add_stream(&p).unwrap();
        s.add_stream(&policy(Ssrc::any_outbound())).unwrap();
        assert_eq!(s.get_protect_trailer_length(false, 0).unwrap(), 10);
        assert_eq!(s.get_protect_rtcp_trailer_length(false, 0).unwrap(), 14);
        assert_eq!(
            s.get_protect_trailer_length(true, 3),
            Err(SrtpError::BadParam)
        );
    }

    #[test]
    fn user_data_downcasts() {
        let mut s = session();
        assert!(s.user_data::<u32>().is_none());
        s.set_user_data(42u32);
        assert_eq!(s.user_data::<u32>(), Some(&42));
        assert!(s.user_data::<String>().is_none());
    }

    #[test]
    fn update_specific_keeps_index() {
        let mut s = session();
        s.add_stream(&policy(Ssrc::specific(8))).unwrap();
        s.streams.get_mut(&8).unwrap().rtp_rdbx.add_index(300).unwrap();
        s.streams.get_mut(&8).unwrap().rtcp_rdb.add_index(4).unwrap();

        let mut p = policy(Ssrc::specific(8));
        p.keys = vec![MasterKey::new(vec![9u8; 30])];
        s.update_stream(&p).unwrap();

        let st = s.stream(8).unwrap();
        assert_eq!(st.packet_index(), 300);
        assert_eq!(st.rtcp_rdb.check(4), Err(SrtpError::ReplayFail));
        assert_eq!(
            s.update_stream(&policy(Ssrc::specific(99))),
            Err(SrtpError::BadParam)
        );
    }

    #[test]
    fn update_template_recreates_derived_streams() {
        let mut s = session();
        s.add_stream(&policy(Ssrc::any_outbound())).unwrap();
        s.add_stream(&policy(Ssrc::specific(1))).unwrap();
        {
            let (st, _) = s.sender_stream(2, true).unwrap();
            st.rtp_rdbx.add_index(50).unwrap();
        }
        s.update_stream(&policy(Ssrc::any_outbound())).unwrap();

        let derived = s.stream(2).unwrap();
        assert!(derived.is_from_template());
        assert_eq!(derived.packet_index(), 50);
        assert!(!s.stream(1).unwrap().is_from_template());
        assert_eq!(
            session().update_stream(&policy(Ssrc::any_inbound())),
            Err(SrtpError::BadParam)
        );
    }
}

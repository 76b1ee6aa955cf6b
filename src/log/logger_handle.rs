use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink};

/// Cloneable sink that queues [`LogMsg`]s on a bounded channel.
///
/// [`try_log`](Self::try_log) never blocks: when the queue is full the line
/// is dropped and the error returned. The receiving end belongs to whoever
/// writes the lines out.
///
/// ```ignore
/// let (handle, rx) = LoggerHandle::channel(1024);
/// let session = SrtpSession::new(Arc::new(handle));
/// std::thread::spawn(move || for m in rx { eprintln!("{m}") });
/// ```
#[derive(Clone)]
pub struct LoggerHandle {
    tx: mpsc::SyncSender<LogMsg>,
    min_level: LogLevel,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    /// Handle plus the receiver for its lines, queueing at most `cap`.
    pub fn channel(cap: usize) -> (Self, mpsc::Receiver<LogMsg>) {
        let (tx, rx) = mpsc::sync_channel(cap);
        (Self::new(tx), rx)
    }

    pub fn new(tx: mpsc::SyncSender<LogMsg>) -> Self {
        Self {
            tx,
            min_level: LogLevel::Trace,
        }
    }

    /// Drops lines below `level` before they reach the queue.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Queues one line stamped with the current time.
    ///
    /// Lines below the minimum level are discarded and count as sent.
    ///
    /// # Errors
    /// `TrySendError::Full` when the queue is at capacity,
    /// `TrySendError::Disconnected` when the receiver is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        if level < self.min_level {
            return Ok(());
        }
        self.tx
            .try_send(LogMsg::new(level, text, target, now_millis()))
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::sync::mpsc::TrySendError;

    #[test]
    fn queued_line_keeps_metadata() {
        let (h, rx) = LoggerHandle::channel(2);
        h.try_log(LogLevel::Info, "stream added", "test::target")
            .unwrap();

        let msg = rx.recv().expect("a message should arrive");
        assert_eq!(msg.level, LogLevel::Info);
        assert_eq!(msg.text, "stream added");
        assert_eq!(msg.target, "test::target");
        assert!(msg.ts_ms > 0);
    }

    #[test]
    fn full_queue_drops_the_line() {
        let (h, _rx) = LoggerHandle::channel(1);
        h.try_log(LogLevel::Warn, "first", "t").unwrap();

        match h.try_log(LogLevel::Warn, "second", "t") {
            Err(TrySendError::Full(m)) => assert_eq!(m.text, "second"),
            other => panic!("expected Full, got: {:?}", other),
        }
    }

    #[test]
    fn closed_receiver_is_reported() {
        let (h, rx) = LoggerHandle::channel(1);
        drop(rx);
        assert!(matches!(
            h.try_log(LogLevel::Error, "lost", "t"),
            Err(TrySendError::Disconnected(_))
        ));
    }

    #[test]
    fn lines_below_min_level_are_skipped() {
        let (h, rx) = LoggerHandle::channel(4);
        let h = h.with_min_level(LogLevel::Warn);
        h.log(LogLevel::Debug, "noise", "t");
        h.log(LogLevel::Error, "kept", "t");
        drop(h);
        let lines: Vec<_> = rx.iter().map(|m| m.text).collect();
        assert_eq!(lines, vec!["kept".to_string()]);
    }
}

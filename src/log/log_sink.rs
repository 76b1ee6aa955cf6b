use crate::log::log_level::LogLevel;

/// Destination for log lines. Shared between threads, so implementations
/// must not block.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}

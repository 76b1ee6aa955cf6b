//! Leveled logging through a pluggable [`LogSink`](log_sink::LogSink).
//!
//! Engine code logs with the `sink_*!` macros; the application decides where
//! the lines go by handing the session a sink.

pub mod log_level;
pub mod log_macros;
pub mod log_msg;
pub mod log_sink;
pub mod logger_handle;
pub mod noop_log_sink;

pub use log_level::LogLevel;
pub use log_msg::LogMsg;
pub use log_sink::LogSink;
pub use logger_handle::LoggerHandle;
pub use noop_log_sink::NoopLogSink;

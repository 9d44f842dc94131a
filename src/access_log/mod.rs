//! Access logging subsystem.
//!
//! # Data Flow
//! ```text
//! engine (redirect decided)
//!     → record.rs (AccessLogRecord, truncated fields)
//!     → spawned task → sink.rs (tracing / JSON lines file / memory / noop)
//!     → on error: tracing::error! + failure counter, never the response
//! ```

pub mod record;
pub mod sink;

pub use record::AccessLogRecord;
pub use sink::{
    build_sink, AccessLogError, AccessLogSink, JsonLinesAccessLog, MemoryAccessLog, NoopAccessLog,
    TracingAccessLog,
};

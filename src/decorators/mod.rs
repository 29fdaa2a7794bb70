//! Cross-cutting layers over any [`crate::DbClient`].
//!
//! Both decorators implement the full client contract by forwarding to the wrapped client,
//! so they nest in either order and can wrap borrowed, shared or owned clients.

pub mod error;
pub mod logging;

pub use error::ErrorDecorator;
pub use logging::{LoggingDecorator, MemorySink, QueryLogEntry, QueryLogSink, TracingSink};

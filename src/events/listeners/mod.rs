//! Ready-made listeners for common concerns.

mod logging;
#[cfg(feature = "tracing")]
mod tracing;

pub use logging::LoggingListener;
#[cfg(feature = "tracing")]
pub use tracing::TracingListener;

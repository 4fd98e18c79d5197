// svckit/src/lib.rs
//
// Shared building blocks for proxy-log-viewer: the wire types served by the
// proxy's monitoring endpoints, the error taxonomy and reusable config blocks.

pub mod config;
pub mod errors;
pub mod types;

pub use errors::ViewerError;
pub use types::{HealthSnapshot, LogLevel, LogRecord, LogsResponse};

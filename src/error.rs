//! Error classification shared by the completion adapter and the dispatcher.

/// Stable machine-readable code plus a retry hint for surfaced errors.
///
/// The code is rendered in the error banner so operators can match a
/// user report to a log line without exposing upstream response bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

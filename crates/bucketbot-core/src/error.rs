//! Error metadata
//!
//! Each crate defines its own `thiserror` enum. They all implement
//! [`ErrorMetadata`] so the bot can decide how loudly to log a failure and
//! what to show the user without inspecting provider-specific fields.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like missing arguments
    Debug,
    /// Warning level - for conditions the user can fix (absent object, unsupported ACL)
    Warn,
    /// Error level - for unexpected provider or transport failures
    Error,
}

/// Describes how an error should be presented to the chat user and the logs.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Text shown to the user after the `Error: ` prefix
    fn user_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

//! Tracing initialization
//!
//! This module installs the global tracing subscriber for the binaries.

mod init;

pub use init::{init_telemetry, LogFormat};

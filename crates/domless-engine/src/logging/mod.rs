//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only talks to the `log`
//! facade; hosts call [`init_logging`] once at startup.

mod init;

pub use init::{init_logging, LoggingConfig};

//! Logging setup.
//!
//! Everything logs through the `log` facade; `init_logging` installs
//! `env_logger` as the backend. GPU debug output uses target `prism::gpu`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};

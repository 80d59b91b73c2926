//! Utility modules: developer log sink, logger setup, numeric helpers.
pub mod devlog;
pub mod logger;
pub mod num;

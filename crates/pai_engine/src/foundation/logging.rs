//! Logging setup on top of the `log` facade

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
///
/// Panics if a logger was already installed; hosts call this once from `main`.
pub fn init() {
    env_logger::init();
}

/// Initialize logging, ignoring an already-installed logger
///
/// Safe to call from every test that wants log output.
pub fn try_init() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}

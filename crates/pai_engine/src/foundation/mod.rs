//! Foundation utilities shared by every other module
//!
//! Math aliases, logging setup and frame timing.

pub mod logging;
pub mod math;
pub mod time;

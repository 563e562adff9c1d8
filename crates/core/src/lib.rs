//! Shared building blocks for the Victory identity services.
//!
//! This crate holds the ambient pieces every Victory crate leans on: logging
//! initialisation, the wall clock used for expiry decisions, and the log
//! fingerprinting used to keep mailbox addresses out of log output.

pub mod clock;
pub mod fingerprint;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fingerprint::fingerprint;
pub use logging::LogFormat;

//! Logging setup shared by the wirebench binaries.
//!
//! ```rust,no_run
//! use wirebench_observe::{LoggerConfig, LoggerFormat, logger_init};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LoggerConfig::new(LoggerFormat::Text, "wirebench_client=debug,info");
//! logger_init(&cfg)?;
//! # Ok(())
//! # }
//! ```
mod logger;
pub use logger::*;

#[cfg(feature = "subscriber")]
mod subscriber;
#[cfg(feature = "subscriber")]
pub use subscriber::SupervisorEvents;

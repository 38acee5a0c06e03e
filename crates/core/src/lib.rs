//! Battery telemetry simulation: a fixed-period state machine feeding a
//! bounded chart history and one-shot threshold notifications.

pub mod battery;
pub mod config;
pub mod history;
pub mod io;
pub mod notify;
pub mod runtime;
pub mod types;

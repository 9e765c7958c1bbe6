//! Turns a decoded replay into per player, per round and per event output.

pub mod aggregate;
pub mod assemble;
pub mod eventlog;
pub mod metrics;
pub mod replay;

pub use assemble::{assemble, parse};

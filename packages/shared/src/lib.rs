//! Utilities shared by the Kyodo server binary and its tests.

pub mod logger;
pub mod time;

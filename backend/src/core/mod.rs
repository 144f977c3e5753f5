//! Time management

pub mod time;

pub use time::{Clock, ClockError, SimTime};

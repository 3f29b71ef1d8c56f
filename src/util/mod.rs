//! Utility modules: deadlines.

pub mod timeout;

pub use timeout::cancel_after;

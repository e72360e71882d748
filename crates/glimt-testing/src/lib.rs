//! Test support for the Glimt client.
//!
//! Provides an in-process recording sink with programmable failures and
//! deterministic event fixtures, so pipeline behavior can be tested without
//! any network dependency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod sink;

pub use sink::RecordingSink;

//! Shared utilities for the irori chat service.
//!
//! This crate holds the small pieces used by every binary: time handling
//! and logging setup.

pub mod logger;
pub mod time;

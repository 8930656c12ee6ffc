//! Shared utilities for the Soro chat server.
//!
//! Currently logging setup and time helpers, used by the server crate and
//! its binary.

pub mod logger;
pub mod time;

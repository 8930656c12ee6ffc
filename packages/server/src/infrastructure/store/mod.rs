//! Store implementations.
//!
//! - `inmemory`: HashMap-backed stand-in for the document database,
//!   used by the binary and by tests.

pub mod inmemory;

pub use inmemory::InMemoryChatStore;

//! Test helpers for service unit tests
//!
//! Hosting and key-value doubles with fault injection, so each step of the
//! persistence fallback chain can be failed independently.

pub mod mock_hosting;
pub mod mock_kv;

pub use mock_hosting::*;
pub use mock_kv::*;

//! Shared wire types and codecs for platform lifecycle callbacks.
//!
//! Nothing in this crate performs I/O. Network access (key retrieval) and the
//! dispatch state machine live in `appcycle-core`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod marshal;
pub mod naming;
pub mod objects;
pub mod registry;
pub mod signature;
pub mod timestamp;

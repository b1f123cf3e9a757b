#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod keys;
pub mod pages;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use dispatcher::Dispatcher;
pub use error::{AppError, ErrorKind};
pub use handler::LifecycleHandler;

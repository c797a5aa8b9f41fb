//! Common types shared across the delegate crates.

mod common;
mod message;

pub use common::*;
pub use message::*;

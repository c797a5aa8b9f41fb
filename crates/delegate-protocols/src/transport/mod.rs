//! Conversation transport protocol definitions.
//!
//! A transport sends one turn to a model and streams back content fragments
//! and tool-call requests. Wire formats live behind this trait.

mod event;
mod request;
mod traits;

pub use event::*;
pub use request::*;
pub use traits::*;

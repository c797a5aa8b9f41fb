//! Delegation tools.

mod spawn;
mod todo;

pub use spawn::*;
pub use todo::*;

//! Tool protocol definitions.
//!
//! Tools are the only way an agent acts on the world. Sub-agents see a
//! derived subset of the parent's tools.

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;

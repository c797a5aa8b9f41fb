//! Error types for the delegate protocol layer.

mod extension;
mod session;
mod tool;
mod transport;

pub use extension::*;
pub use session::*;
pub use tool::*;
pub use transport::*;

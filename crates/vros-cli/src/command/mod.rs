//! Command implementations.

mod manifest;
mod play;
mod shutdown;

pub use manifest::build_manifest;
pub use play::play;

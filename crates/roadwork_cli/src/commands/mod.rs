//! CLI command implementations.

pub mod block;
pub mod seed;
pub mod status;
pub mod sync;
pub mod touch;

//! CLI command implementations.

pub mod common;
pub mod decode;
pub mod devices;
pub mod live;
pub mod process;

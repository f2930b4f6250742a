//! Configuration sources.

mod file;
mod memory;

pub use file::{ConfigFormat, FileConfigSource};
pub use memory::StaticConfigSource;

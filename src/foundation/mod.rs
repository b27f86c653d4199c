pub mod buffer;
pub mod core;
pub mod error;

pub mod coordinator;
pub mod kernel;
pub mod plan;

pub mod classifier;
pub mod protocol;
pub mod types;

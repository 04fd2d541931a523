pub mod branches;
pub mod build;
pub mod client;
pub mod log;
pub mod types;

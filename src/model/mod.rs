pub mod arg;
pub mod config;

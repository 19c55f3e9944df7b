pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod store;
pub mod util;
pub mod verify;

pub mod catalog;
pub mod config;
pub mod error;
pub mod global;
pub mod merge;
pub mod sources;
pub mod storage;
pub mod types;
pub mod util;

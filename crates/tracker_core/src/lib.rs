pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod stats;
pub mod storage;
pub mod task_api;
pub mod validate;

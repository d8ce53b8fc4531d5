

pub mod config;
pub mod datasets;
pub mod scaling;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod dictionary;

pub use config::{files_handling, Config, Settings};
pub use pipeline::Pipeline;

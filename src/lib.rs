pub mod analyzers;
pub mod config;
pub mod courses;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod render;
pub mod stats;

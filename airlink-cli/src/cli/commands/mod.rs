pub mod config;
pub mod extension;
pub mod records;
pub mod serve;

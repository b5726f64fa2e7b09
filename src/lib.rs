pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod learning;
pub mod logging;
pub mod store;
pub mod validation;
pub mod workers;

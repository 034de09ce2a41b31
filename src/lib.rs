// src/lib.rs
pub mod aggregator;
pub mod config;
pub mod cycle;
pub mod dispatcher;
pub mod errors;
pub mod patterns;
pub mod signal_filter;
pub mod store;
pub mod subscriber;
pub mod trend;
pub mod types;

// Presentify client - Library root for testing

pub mod config;
pub mod controller;
pub mod disposition;
pub mod download;
pub mod endpoint;
pub mod error;
pub mod http_client;
pub mod submission;

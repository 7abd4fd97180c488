pub mod commands;
pub mod config;
pub mod framework;
pub mod transport;

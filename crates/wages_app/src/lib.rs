//! Wage board application: configuration, the terminal session and the
//! record-store server.
pub mod config;
pub mod platform;
pub mod server;

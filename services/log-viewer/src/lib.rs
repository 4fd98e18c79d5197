// services/log-viewer/src/lib.rs
//
// Log Viewer - Library exports
//

pub mod api;
pub mod app;
pub mod classify;
pub mod clipboard;
pub mod config;
pub mod detail;
pub mod export;
pub mod filter;
pub mod mock;
pub mod poller;
pub mod state;
pub mod ui;

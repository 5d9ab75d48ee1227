pub mod agent;
pub mod api;
pub mod app;
pub mod config;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod store;
pub mod tui;
pub mod ui;

pub mod api;
pub mod auth;
pub mod automation;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

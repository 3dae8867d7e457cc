//! tablescope: browse Antelope contract tables and build action commands
//! from a terminal.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod store;
pub mod ui;

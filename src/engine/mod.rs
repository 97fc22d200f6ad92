// src/engine/mod.rs
pub mod auth;
pub mod client;
pub mod config;
pub mod config_file;
pub mod history;
pub mod model;
pub mod parser;
pub mod profile;
pub mod prompt;
pub mod session;

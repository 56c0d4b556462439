pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod session;
pub mod settings;
pub mod state;

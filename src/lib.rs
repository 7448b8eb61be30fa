pub mod app;
pub mod auth;
pub mod avapi;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod uapi;

#[cfg(test)]
pub mod testing;

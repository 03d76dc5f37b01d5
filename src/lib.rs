//! Restaurant listings with owner-controlled pinning.
//!
//! The binary in `main.rs` only wires configuration, storage and the router
//! together; everything else lives here so it can be tested.

pub mod auth;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

//! Core todos library (session access, identity provider, todo API, controllers).

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod todos;

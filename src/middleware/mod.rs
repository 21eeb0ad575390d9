//! Middleware module
//!
//! Request logging and optional API key authentication for the hook service

pub mod auth;
pub mod logging;

//! # Taskboard API Server Library
//!
//! Core of the Taskboard API server: a JSON API over projects and tasks
//! with bearer token authentication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `validation`: Field-level request validation
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod validation;

// src/lib.rs
//! Client library for the job-board REST API: typed requests, form
//! validation, a query cache and the elevator pitch lifecycle.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod pitch;
pub mod types;
pub mod validation;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;

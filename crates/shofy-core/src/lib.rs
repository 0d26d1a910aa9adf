//! Cross-cutting service plumbing: config loading, common errors, health
//! probes, request-id middleware and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod tracing;

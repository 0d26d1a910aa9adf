//! Test utilities for Shofy services.
//!
//! Provides `MockSession` for signing session tokens and building the
//! request headers that carry them. Dev-dependency only.

pub mod auth;

//! Auth types shared across Shofy services.
//!
//! Provides session-token validation, the token cookie builders, and the
//! `BearerToken` extractor.

pub mod cookie;
pub mod identity;
pub mod token;

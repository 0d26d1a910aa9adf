//! Domain types shared across all Shofy services.
//!
//! Ids, role names and phone helpers; no framework dependencies.

pub mod id;
pub mod phone;
pub mod role;

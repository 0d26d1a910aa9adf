//! sea-orm entities for the tables the auth service reads and writes.
//!
//! `users`, `roles` and `user_roles` are owned by the user/role services and
//! only read here; `user_login_otp` is owned by the auth service.

pub mod roles;
pub mod user_login_otp;
pub mod user_roles;
pub mod users;

//! Role names and role-based access checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a role granted to a user (e.g. `ADMIN`, `PRODUCT_DELETE`).
///
/// Role names are data-driven (rows in the `roles` table), so they are kept as
/// strings, but every value is validated on construction: non-empty, at most
/// [`RoleName::MAX_LEN`] bytes, only `A-Z`, `0-9` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

/// Error returned when a string is not a valid [`RoleName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleNameError {
    #[error("role name is empty")]
    Empty,
    #[error("role name is longer than {max} bytes")]
    TooLong { max: usize },
    #[error("role name {0:?} contains characters outside A-Z, 0-9 and '_'")]
    InvalidChars(String),
}

impl RoleName {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: impl Into<String>) -> Result<Self, RoleNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RoleNameError::Empty);
        }
        if name.len() > Self::MAX_LEN {
            return Err(RoleNameError::TooLong { max: Self::MAX_LEN });
        }
        let valid = name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(RoleNameError::InvalidChars(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoleName {
    type Err = RoleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(role: RoleName) -> Self {
        role.0
    }
}

/// Returns `true` when `granted` and `required` share at least one role.
///
/// Any single match grants access (logical OR across `required`). An empty
/// `required` set never matches.
pub fn has_any_role(granted: &[RoleName], required: &[RoleName]) -> bool {
    granted.iter().any(|role| required.contains(role))
}

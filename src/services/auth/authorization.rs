//! Coarse group-membership gate.
//!
//! A caller is either in the required group or not; there is no role
//! hierarchy and no per-operation permission map.

use serde_json::Value;
use thiserror::Error;

use crate::services::auth::claims::ClaimSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("user not in any group")]
    NoGroups,
    #[error("user not in required group {0}")]
    NotInRequiredGroup(String),
}

impl AccessDenied {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoGroups => "NO_GROUPS",
            Self::NotInRequiredGroup(_) => "NOT_IN_REQUIRED_GROUP",
        }
    }
}

/// Allow only when `required_group` is an exact member of `cognito:groups`.
pub fn authorize(claims: &ClaimSet, required_group: &str) -> Result<(), AccessDenied> {
    let groups = claims
        .groups()
        .filter(|groups| !groups.is_empty())
        .ok_or(AccessDenied::NoGroups)?;

    if groups
        .iter()
        .any(|group| matches!(group, Value::String(name) if name == required_group))
    {
        Ok(())
    } else {
        Err(AccessDenied::NotInRequiredGroup(required_group.to_string()))
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Role attached to a user identity.
#[cfg_attr(feature = "spacetimedb", derive(spacetimedb::SpacetimeType))]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Recycler,  // Submits pickup requests
    Collector, // Fulfils them and triggers the award
    Admin,
}

impl Role {
    /// Whether this role may trigger the coin award on collection.
    pub fn can_award_coins(self) -> bool {
        !matches!(self, Role::Recycler)
    }

    /// Whether this role may override the material base rates.
    pub fn can_configure_rates(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether a new user may pick this role for themselves. Admin is only
    /// open to the identity that owns the deployment.
    pub fn may_self_register(self, is_owner: bool) -> bool {
        match self {
            Role::Admin => is_owner,
            Role::Recycler | Role::Collector => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Recycler => "recycler",
            Role::Collector => "collector",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recycler" => Ok(Role::Recycler),
            "collector" => Ok(Role::Collector),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

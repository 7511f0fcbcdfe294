//! Participant roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named party in the teleportation protocol.
///
/// Exactly one client may hold a role at a time. Alice owns the unknown
/// state being transferred; Bob receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Alice,
    Bob,
}

impl Role {
    /// All roles, in a fixed order.
    pub const ALL: [Role; 2] = [Role::Alice, Role::Bob];

    /// The role on the other end of the protocol.
    pub fn peer(&self) -> Role {
        match self {
            Role::Alice => Role::Bob,
            Role::Bob => Role::Alice,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Alice => "alice",
            Role::Bob => "bob",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alice" => Ok(Role::Alice),
            "bob" => Ok(Role::Bob),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Alice".parse::<Role>().unwrap(), Role::Alice);
        assert_eq!("BOB".parse::<Role>().unwrap(), Role::Bob);
        assert!("charlie".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Alice).unwrap(), "\"alice\"");
        assert_eq!(serde_json::to_string(&Role::Bob).unwrap(), "\"bob\"");
    }

    #[test]
    fn test_peer_is_symmetric() {
        for role in Role::ALL {
            assert_eq!(role.peer().peer(), role);
        }
    }
}

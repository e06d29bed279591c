//! Client Identity
//!
//! Who submitted a transaction. Passed explicitly into every operation and
//! captured on entities for provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the submitting client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Membership service provider (organization) id
    pub msp_id: String,

    /// Username within the organization
    pub username: String,
}

impl ClientIdentity {
    pub fn new(msp_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            username: username.into(),
        }
    }

    /// Check if this identity is the given user, ignoring surrounding whitespace
    pub fn is(&self, username: &str) -> bool {
        self.username.trim() == username.trim()
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.msp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let identity = ClientIdentity::new("Org1MSP", "organizer");
        assert_eq!(identity.to_string(), "organizer@Org1MSP");
    }

    #[test]
    fn test_identity_match_trims() {
        let identity = ClientIdentity::new("Org1MSP", " alice ");
        assert!(identity.is("alice"));
        assert!(!identity.is("bob"));
    }
}

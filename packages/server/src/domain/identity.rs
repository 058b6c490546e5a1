//! Authenticated identity handed to the admission path.

use serde::{Deserialize, Serialize};

use super::{DisplayName, UserId};

/// Role carried in the identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

/// A verified user, produced once by the token verifier and passed by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: DisplayName, role: Role) -> Self {
        Self {
            user_id,
            display_name,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

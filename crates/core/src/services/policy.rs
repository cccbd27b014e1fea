//! Who may submit what.

use serde::{Deserialize, Serialize};

use crate::error::{EmoteError, EmoteResult};

/// Role of the acting user as reported by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    /// Decode the numeric role used by the account store (`1` = admin).
    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        if level >= 1 { Self::Admin } else { Self::Member }
    }
}

/// The user on whose behalf a submission runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: String,
    pub role: Role,
}

impl ActingUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Members may only touch emotes under one of the whitelisted subdirectories.
pub fn ensure_may_submit(
    user: &ActingUser,
    canonical_name: &str,
    whitelist: &[String],
) -> EmoteResult<()> {
    if user.is_admin() || whitelist.iter().any(|dir| canonical_name.starts_with(dir.as_str())) {
        return Ok(());
    }

    Err(EmoteError::Forbidden(format!(
        "{canonical_name} is outside the directories open to members"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> ActingUser {
        ActingUser {
            id: "u1".to_string(),
            role,
        }
    }

    #[test]
    fn test_member_restricted_to_whitelist() {
        let whitelist = vec!["mls/volatile/".to_string()];

        assert!(ensure_may_submit(&user(Role::Member), "mls/volatile/derp", &whitelist).is_ok());
        assert!(matches!(
            ensure_may_submit(&user(Role::Member), "mls/derp", &whitelist),
            Err(EmoteError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_unrestricted() {
        assert!(ensure_may_submit(&user(Role::Admin), "anything", &[]).is_ok());
    }

    #[test]
    fn test_role_levels() {
        assert_eq!(Role::from_level(0), Role::Member);
        assert_eq!(Role::from_level(1), Role::Admin);
    }
}

//! Credential issuance for relief-node
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - The two fixed roles and registration-key mapping

pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

pub use jwt::{extract_bearer_token, Claims, TokenIssuer};
pub use password::{hash_password, verify_password};

/// The two fixed roles. There is no finer-grained policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    FieldVolunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::FieldVolunteer => "field_volunteer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "administrator" => Some(Self::Administrator),
            "field_volunteer" => Some(Self::FieldVolunteer),
            _ => None,
        }
    }
}

/// Map a registration key to the role it grants, `None` for unknown keys.
pub fn role_for_registration_key(config: &AuthConfig, key: &str) -> Option<Role> {
    if key == config.admin_key {
        Some(Role::Administrator)
    } else if key == config.volunteer_key {
        Some(Role::FieldVolunteer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a-test-secret-that-is-32-chars-long!".into(),
            token_expiry_secs: 1800,
            admin_key: "ADMIN12345".into(),
            volunteer_key: "FIELDVOLUNTEER67890".into(),
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Administrator, Role::FieldVolunteer] {
            assert_eq!(Role::from_tag(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_tag("root"), None);
    }

    #[test]
    fn test_registration_key_mapping() {
        let config = auth_config();
        assert_eq!(
            role_for_registration_key(&config, "ADMIN12345"),
            Some(Role::Administrator)
        );
        assert_eq!(
            role_for_registration_key(&config, "FIELDVOLUNTEER67890"),
            Some(Role::FieldVolunteer)
        );
        assert_eq!(role_for_registration_key(&config, "nope"), None);
    }
}

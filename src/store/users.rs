//! Credential rows and the durable token-revocation store
//!
//! Revocation is keyed by token id (`jti`) with the token's own expiry as
//! TTL; expired rows are purged opportunistically so the table never grows
//! past the set of still-live tokens.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::auth::Role;
use crate::error::{ReliefError, Result};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

impl Store {
    pub fn create_user(&mut self, username: &str, password_hash: &str, role: Role) -> Result<User> {
        if username.trim().is_empty() {
            return Err(ReliefError::InvalidInput("username is empty".into()));
        }
        let tx = self.begin()?;
        let taken: Option<i64> = tx
            .prepare_cached("SELECT id FROM users WHERE username = ?1")?
            .query_row([username], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(ReliefError::InvalidInput(format!(
                "username '{username}' is already registered"
            )));
        }
        tx.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        })
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .prepare_cached("SELECT id, username, password_hash, role FROM users WHERE username = ?1")?
            .query_row([username], |row| {
                let role_tag: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: Role::from_tag(&role_tag).unwrap_or(Role::FieldVolunteer),
                })
            })
            .optional()?;
        Ok(user)
    }

    /// Record a token id as revoked until it would have expired anyway.
    pub fn revoke_token(&mut self, jti: &str, expires_at: i64) -> Result<()> {
        let tx = self.begin()?;
        tx.execute(
            "DELETE FROM revoked_tokens WHERE expires_at < strftime('%s', 'now')",
            [],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO revoked_tokens (jti, expires_at) VALUES (?1, ?2)",
            params![jti, expires_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        let found: Option<String> = self
            .conn()
            .prepare_cached(
                "SELECT jti FROM revoked_tokens
                 WHERE jti = ?1 AND expires_at >= strftime('%s', 'now')",
            )?
            .query_row([jti], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::Utc;

    #[test]
    fn test_create_and_fetch_user() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .create_user("aylin", "$argon2id$fake", Role::Administrator)
            .unwrap();
        let user = store.user_by_username("aylin").unwrap().unwrap();
        assert_eq!(user.role, Role::Administrator);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .create_user("aylin", "hash", Role::FieldVolunteer)
            .unwrap();
        assert!(store
            .create_user("aylin", "hash", Role::FieldVolunteer)
            .is_err());
    }

    #[test]
    fn test_revocation_lifecycle() {
        let mut store = Store::open_in_memory().unwrap();
        let future = Utc::now().timestamp() + 3600;

        assert!(!store.is_token_revoked("tok-1").unwrap());
        store.revoke_token("tok-1", future).unwrap();
        assert!(store.is_token_revoked("tok-1").unwrap());
    }

    #[test]
    fn test_expired_revocation_no_longer_blocks() {
        let mut store = Store::open_in_memory().unwrap();
        let past = Utc::now().timestamp() - 10;
        store.revoke_token("tok-old", past).unwrap();
        assert!(!store.is_token_revoked("tok-old").unwrap());
    }
}

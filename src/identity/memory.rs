//! In-process identity store.

use std::sync::RwLock;

use super::{Identity, IdentityStore, NewIdentity, normalize_email};
use crate::prelude::*;

#[derive(Default)]
struct Inner {
    next_id: i64,
    identities: Vec<Identity>,
}

/// Identity store kept in memory for the life of the process.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Inner>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find<F>(&self, predicate: F) -> Result<Option<Identity>>
    where
        F: Fn(&Identity) -> bool,
    {
        let inner = self.inner.read().map_err(|_| Error::StorePoisoned)?;
        Ok(inner.identities.iter().find(|i| predicate(i)).cloned())
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn insert(&self, identity: NewIdentity) -> Result<Identity> {
        let mut inner = self.inner.write().map_err(|_| Error::StorePoisoned)?;
        let email = normalize_email(&identity.email);

        if inner.identities.iter().any(|i| i.email == email) {
            return Err(Error::EmailTaken);
        }
        if inner
            .identities
            .iter()
            .any(|i| i.username == identity.username)
        {
            return Err(Error::UsernameTaken);
        }

        inner.next_id += 1;
        let stored = Identity {
            user_id: inner.next_id,
            username: identity.username,
            email,
            password_hash: identity.password_hash,
            created_at: identity.created_at,
            email_verified: false,
            verification_token: identity.verification_token,
            verification_expiry: identity.verification_expiry,
        };
        inner.identities.push(stored.clone());
        Ok(stored)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let email = normalize_email(email);
        self.find(|i| i.email == email)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        self.find(|i| i.username == username)
    }

    fn find_by_verification_token(&self, token: &str) -> Result<Option<Identity>> {
        self.find(|i| i.verification_token.as_deref() == Some(token))
    }

    fn mark_email_verified(&self, user_id: i64) -> Result<Identity> {
        let mut inner = self.inner.write().map_err(|_| Error::StorePoisoned)?;
        let identity = inner
            .identities
            .iter_mut()
            .find(|i| i.user_id == user_id)
            .ok_or(Error::IdentityNotFound)?;

        identity.email_verified = true;
        identity.verification_token = None;
        identity.verification_expiry = None;
        Ok(identity.clone())
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    fn new_identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: String::from("$argon2id$placeholder"),
            created_at: Utc::now(),
            verification_token: Some(format!("token-{username}")),
            verification_expiry: None,
        }
    }

    #[test]
    fn assigns_increasing_ids_and_lowercases_email() -> Result<()> {
        let store = InMemoryIdentityStore::new();
        let alice = store.insert(new_identity("alice", "Alice@Example.com"))?;
        let bob = store.insert(new_identity("bob", "bob@example.com"))?;

        assert_eq!(alice.user_id, 1);
        assert_eq!(bob.user_id, 2);
        assert_eq!(alice.email, "alice@example.com");
        assert!(!alice.email_verified);
        Ok(())
    }

    #[test]
    fn enforces_uniqueness() -> Result<()> {
        let store = InMemoryIdentityStore::new();
        store.insert(new_identity("alice", "alice@example.com"))?;

        assert!(matches!(
            store.insert(new_identity("alice2", "ALICE@example.com")),
            Err(Error::EmailTaken)
        ));
        assert!(matches!(
            store.insert(new_identity("alice", "other@example.com")),
            Err(Error::UsernameTaken)
        ));
        Ok(())
    }

    #[test]
    fn lookups() -> Result<()> {
        let store = InMemoryIdentityStore::new();
        store.insert(new_identity("alice", "alice@example.com"))?;

        assert!(store.find_by_email(" ALICE@example.com ")?.is_some());
        assert!(store.find_by_username("alice")?.is_some());
        assert!(store.find_by_username("Alice")?.is_none());
        assert!(store.find_by_verification_token("token-alice")?.is_some());
        assert!(store.find_by_verification_token("token-bob")?.is_none());
        Ok(())
    }

    #[test]
    fn verifying_clears_the_token() -> Result<()> {
        let store = InMemoryIdentityStore::new();
        let alice = store.insert(new_identity("alice", "alice@example.com"))?;

        let verified = store.mark_email_verified(alice.user_id)?;
        assert!(verified.email_verified);
        assert!(verified.verification_token.is_none());
        assert!(store.find_by_verification_token("token-alice")?.is_none());
        assert!(matches!(
            store.mark_email_verified(99),
            Err(Error::IdentityNotFound)
        ));
        Ok(())
    }
}

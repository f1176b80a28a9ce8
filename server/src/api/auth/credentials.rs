//! Credential verification with positive-result caching
//!
//! Verified username/password pairs are cached under a SHA-256 digest key,
//! so repeated requests skip the store without the plaintext pair ever
//! appearing in a cache key. Failed attempts are never cached; a wrong
//! password always goes to the store and always fails there.

use std::sync::Arc;

use crate::data::TransactionalRepository;
use crate::data::cache::EntityCache;
use crate::data::types::CustomerRow;
use crate::utils::crypto::constant_time_eq;

/// Verifies basic-auth credentials against the customer store
#[derive(Clone)]
pub struct CredentialService {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
}

impl CredentialService {
    pub fn new(repository: Arc<dyn TransactionalRepository>, cache: Arc<EntityCache>) -> Self {
        Self { repository, cache }
    }

    /// Check a username/password pair, returning the customer on success
    pub async fn verify(&self, username: &str, password: &str) -> Option<CustomerRow> {
        let key = self
            .cache
            .keys()
            .credentials::<CustomerRow>(username, password);
        if let Some(hit) = self
            .cache
            .find::<CustomerRow, _>(&key, |c| c.username == username)
            .await
        {
            tracing::trace!(username, "Credential cache hit");
            return Some(hit);
        }

        let customer = match self.repository.get_customer_by_username(username).await {
            Ok(Some(customer)) => customer,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(error = %err, "Credential lookup failed");
                return None;
            }
        };

        if !constant_time_eq(&customer.password, password) {
            return None;
        }

        self.cache
            .put_list(&key, std::slice::from_ref(&customer))
            .await;
        Some(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::testutil::harness;

    async fn service() -> (CredentialService, Arc<EntityCache>) {
        let h = harness().await;
        (
            CredentialService::new(h.repository.clone(), h.cache.clone()),
            h.cache,
        )
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let (credentials, _) = service().await;
        let customer = credentials.verify("alice", "wonderland").await.unwrap();
        assert_eq!(customer.id, 1);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (credentials, _) = service().await;
        assert!(credentials.verify("alice", "builder").await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_same_length() {
        let (credentials, _) = service().await;
        assert!(credentials.verify("alice", "wonderwand").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_username() {
        let (credentials, _) = service().await;
        assert!(credentials.verify("mallory", "anything").await.is_none());
    }

    #[tokio::test]
    async fn test_success_populates_cache() {
        let (credentials, cache) = service().await;
        credentials.verify("bob", "builder").await.unwrap();

        let key = cache.keys().credentials::<CustomerRow>("bob", "builder");
        let cached: Vec<CustomerRow> = cache.get_list(&key).await.unwrap();
        assert_eq!(cached[0].username, "bob");
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let (credentials, cache) = service().await;
        assert!(credentials.verify("bob", "wrong").await.is_none());

        let key = cache.keys().credentials::<CustomerRow>("bob", "wrong");
        assert!(cache.get_list::<CustomerRow>(&key).await.is_none());
    }
}

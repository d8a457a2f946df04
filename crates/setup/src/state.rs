//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::SetupConfig;
use crate::error::SetupError;
use crate::firestore::{FirestoreClient, ServiceAccount};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The database handle is created on first use
/// and then reused for the life of the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SetupConfig,
    store: OnceCell<Arc<dyn DocumentStore>>,
}

impl AppState {
    /// Create state whose store is a Firestore client built on first use.
    #[must_use]
    pub fn new(config: SetupConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: OnceCell::new(),
            }),
        }
    }

    /// Create state around an already constructed store.
    #[must_use]
    pub fn with_store(config: SetupConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: OnceCell::new_with(Some(store)),
            }),
        }
    }

    /// Get a reference to the setup configuration.
    #[must_use]
    pub fn config(&self) -> &SetupConfig {
        &self.inner.config
    }

    /// The process-wide store, initializing it from `account` if needed.
    ///
    /// Concurrent first calls initialize once; the rest wait for it.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::StoreInit` if the client cannot be built.
    pub async fn store(&self, account: &ServiceAccount) -> Result<Arc<dyn DocumentStore>, SetupError> {
        self.inner
            .store
            .get_or_try_init(|| async {
                let client = FirestoreClient::new(account.clone(), &self.inner.config.firestore)
                    .map_err(SetupError::StoreInit)?;
                tracing::info!(project = %client.project_id(), "Firestore client initialized");
                Ok::<_, SetupError>(Arc::new(client) as Arc<dyn DocumentStore>)
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account() -> ServiceAccount {
        ServiceAccount::from_json(
            r#"{"project_id":"shukku-list","client_email":"sa@shukku-list.iam.gserviceaccount.com","private_key":"unused"}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_is_initialized_once() {
        let config = SetupConfig::from_vars(|key| {
            (key == "FIRESTORE_EMULATOR_HOST").then(|| "localhost:8080".to_string())
        })
        .unwrap();
        let state = AppState::new(config);
        let account = account();

        let (first, second) = tokio::join!(state.store(&account), state.store(&account));
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }
}

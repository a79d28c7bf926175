//! Spreadsheet credential lookup.
//!
//! [`KeyStore`] is the async trait for resolving a reference into its plaintext value.
//! [`EnvKeyStore`] implements [`KeyStore`] using environment variables (and `.env`).

mod env;

pub use env::EnvKeyStore;

use anyhow::Result;

/// Resolves a credential reference (e.g. an environment variable name) into a plaintext secret.
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, reference: &str) -> Result<String>;

    /// Like [`KeyStore::get`] but treats a missing secret as `None`.
    async fn find(&self, reference: &str) -> Option<String> {
        self.get(reference).await.ok()
    }
}

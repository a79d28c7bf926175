use anyhow::{Context, Result};

use super::KeyStore;

/// Resolves secrets from process environment variables.
///
/// Values loaded from a `.env` file by `dotenvy` are visible here too. Empty
/// values count as missing.
#[derive(Default)]
pub struct EnvKeyStore;

#[async_trait::async_trait]
impl KeyStore for EnvKeyStore {
    async fn get(&self, reference: &str) -> Result<String> {
        let value = std::env::var(reference)
            .with_context(|| format!("environment variable '{reference}' is not set"))?;
        if value.trim().is_empty() {
            anyhow::bail!("environment variable '{reference}' is empty");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_variable_is_error() {
        let store = EnvKeyStore;
        assert!(store.get("SURVEY_NPS_TEST_UNSET_VARIABLE").await.is_err());
        assert!(store.find("SURVEY_NPS_TEST_UNSET_VARIABLE").await.is_none());
    }

    #[tokio::test]
    async fn test_reads_path_variable() {
        // PATH is set in any test environment.
        let store = EnvKeyStore;
        assert!(store.get("PATH").await.is_ok());
    }
}

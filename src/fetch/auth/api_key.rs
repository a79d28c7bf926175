use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue, InvalidHeaderValue};

/// An [`HttpClient`] wrapper that sets a credential header on every request.
///
/// The header value is validated once at construction so that sending never
/// fails on a malformed token.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: HeaderName, key: &str) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(key)?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// `Authorization: Bearer <token>`, as used by OAuth access tokens.
    pub fn bearer(inner: C, token: &str) -> Result<Self, InvalidHeaderValue> {
        Self::new(inner, AUTHORIZATION, &format!("Bearer {token}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    #[test]
    fn test_bearer_rejects_newlines() {
        let client = BasicClient::new().unwrap();
        assert!(ApiKey::bearer(client, "abc\ndef").is_err());
    }

    #[test]
    fn test_bearer_value_is_sensitive() {
        let client = BasicClient::new().unwrap();
        let auth = ApiKey::bearer(client, "token").unwrap();
        assert_eq!(auth.header_name, AUTHORIZATION);
        assert!(auth.value.is_sensitive());
        assert_eq!(auth.value.to_str().unwrap(), "Bearer token");
    }
}

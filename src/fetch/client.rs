use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a single HTTP request. Implemented by the plain client and by the
/// credential wrappers in [`crate::fetch::auth`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Lets the caller pick an auth wrapper at runtime.
#[async_trait]
impl HttpClient for Box<dyn HttpClient> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}

//! Retrieves the two read-only collections (comments and posts) from the remote API.
//!
//! Both requests are issued concurrently and jointly awaited. The outcome is
//! all-or-nothing: if either request fails to complete, returns a non-success
//! status or carries a body that does not parse, the whole fetch fails.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{Comment, Dataset, Post};

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with http status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not parse response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Request { endpoint, .. } | FetchError::Status { endpoint, .. } | FetchError::Parse { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub comments: String,
    pub posts: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self { comments: format!("{base}/comments"), posts: format!("{base}/posts") }
    }
}

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    endpoints: Endpoints,
}

impl HttpFetcher {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { client: Client::new(), endpoints }
    }

    /// No timeout is applied unless one is given here.
    pub fn with_timeout(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()?, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn fetch_all(&self) -> Result<Dataset, FetchError> {
        let result = tokio::try_join!(
            self.get_json::<Vec<Comment>>(&self.endpoints.comments),
            self.get_json::<Vec<Post>>(&self.endpoints.posts),
        );
        match result {
            Ok((comments, posts)) => {
                info!("fetched {} comments and {} posts", comments.len(), posts.len());
                Ok(Dataset { comments, posts })
            }
            Err(err) => {
                warn!("fetch failed: {err}");
                Err(err)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        debug!("GET {endpoint}");
        let resp = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|source| FetchError::Request { endpoint: endpoint.to_string(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        let body = resp.bytes().await.map_err(|source| FetchError::Request { endpoint: endpoint.to_string(), source })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Parse { endpoint: endpoint.to_string(), source })
    }
}

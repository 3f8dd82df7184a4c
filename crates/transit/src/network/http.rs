//! `reqwest`-backed [`DataFetcher`].

use crate::models::types::{Result, TransitError};
use crate::network::traits::{BoxFuture, DataFetcher};

#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            tracing::debug!(%url, "fetching dataset");
            let response = self.client.get(url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransitError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            Ok(response.bytes().await?.to_vec())
        })
    }
}

use async_trait::async_trait;

use super::Catalog;
use super::PlatformClient;
use crate::category::CategoryRecord;
use crate::error::FetchError;

/// [`Catalog`] over the platform's catalog REST API.
#[derive(Clone, Debug)]
pub struct RestCatalog {
    client: PlatformClient,
}

impl RestCatalog {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Catalog for RestCatalog {
    async fn categories(&self, depth: usize) -> Result<Vec<CategoryRecord>, FetchError> {
        let depth = depth.to_string();
        let url = self.client.endpoint([
            "api",
            "catalog_system",
            "pub",
            "category",
            "tree",
            depth.as_str(),
        ])?;
        self.client.get(url).await
    }

    async fn category(&self, id: &str) -> Result<Option<CategoryRecord>, FetchError> {
        let url = self
            .client
            .endpoint(["api", "catalog", "pvt", "category", id])?;
        self.client.get_optional(url).await
    }
}

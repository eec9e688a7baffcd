use async_trait::async_trait;
use reelbox_models::{CatalogDetails, MediaType};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::{CatalogSource, SearchPage};

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingKey("OMDb"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl CatalogSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(
        &self,
        term: &str,
        page: u32,
        kind: Option<MediaType>,
    ) -> Result<SearchPage, SourceError> {
        api::search(&self.client, &self.base_url, &self.api_key, term, page, kind.as_ref()).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogDetails>, SourceError> {
        api::get_by_id(&self.client, &self.base_url, &self.api_key, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_rejected() {
        let result = OmdbClient::new("  ".to_string(), "https://www.omdbapi.com/".to_string());
        assert!(matches!(result, Err(SourceError::MissingKey("OMDb"))));
    }
}

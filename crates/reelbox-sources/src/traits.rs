use async_trait::async_trait;
use reelbox_models::{CatalogDetails, CatalogItem, Category, MediaType};
use serde::Serialize;

use crate::error::SourceError;

/// One page of catalog search results
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SearchPage {
    pub items: Vec<CatalogItem>,
    pub total_results: u32,
    pub page: u32,
}

/// Movie/TV metadata lookups
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn search(
        &self,
        term: &str,
        page: u32,
        kind: Option<MediaType>,
    ) -> Result<SearchPage, SourceError>;

    /// `Ok(None)` when the catalog has no title with this id
    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogDetails>, SourceError>;

    async fn search_by_category(
        &self,
        category: Category,
        page: u32,
    ) -> Result<SearchPage, SourceError> {
        self.search(category.search_term(), page, category.media_type()).await
    }

    /// Search and keep only series. The total reflects the filtered page.
    async fn tv_shows(&self, term: &str, page: u32) -> Result<SearchPage, SourceError> {
        let mut result = self.search(term, page, None).await?;
        result.items.retain(CatalogItem::is_series);
        result.total_results = result.items.len() as u32;
        Ok(result)
    }
}

/// Video search used to find trailers
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Id of the best matching video, if any
    async fn first_video_id(&self, query: &str) -> Result<Option<String>, SourceError>;
}

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::traits::VideoSearch;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";
const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

/// Known trailers matched by title substring, first match wins
pub const FALLBACK_TRAILERS: [(&str, &str); 10] = [
    ("stranger things", "b9EkMc79ZSU"),
    ("avengers", "TcMBFSGVi1c"),
    ("spider man", "JfVOs4VSpmA"),
    ("batman", "mqqft2x_Aa4"),
    ("superman", "T6DJcgm3wNY"),
    ("wonder woman", "1Q8fG0TtVAY"),
    ("the dark knight", "EXeTwQWrcwY"),
    ("inception", "YoHD9XEInc0"),
    ("interstellar", "zSWdZVtXT7E"),
    ("the matrix", "vKQi3bBA1y8"),
];

pub const DEFAULT_TRAILER: &str = "dQw4w9WgXcQ";

pub fn embed_url(video_id: &str) -> String {
    format!("{}{}", EMBED_BASE, video_id)
}

/// Browser link for an embed URL or a bare video id
pub fn watch_url(reference: &str) -> String {
    let id = reference.strip_prefix(EMBED_BASE).unwrap_or(reference);
    format!("{}{}", WATCH_BASE, id)
}

/// Fallback trailer for a title: the first table match, else the default
pub fn fallback_for(title: &str) -> String {
    let title = title.to_lowercase();
    let id = FALLBACK_TRAILERS
        .iter()
        .find(|(key, _)| title.contains(key))
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_TRAILER);
    embed_url(id)
}

/// Resolves a title to a playable trailer
pub struct TrailerResolver {
    search: Option<Arc<dyn VideoSearch>>,
    demo_fallback: bool,
}

impl TrailerResolver {
    pub fn new(search: Option<Arc<dyn VideoSearch>>, demo_fallback: bool) -> Self {
        Self {
            search,
            demo_fallback,
        }
    }

    pub fn with_fallback(mut self, demo_fallback: bool) -> Self {
        self.demo_fallback = demo_fallback;
        self
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Embed URL for the title's trailer. `None` only when the lookup
    /// failed and fallback is disabled.
    pub async fn resolve(&self, title: &str) -> Option<String> {
        if let Some(search) = &self.search {
            match search.first_video_id(&format!("{} trailer", title)).await {
                Ok(Some(id)) => {
                    info!(title = %title, video_id = %id, "Trailer found");
                    return Some(embed_url(&id));
                }
                Ok(None) => debug!(title = %title, "Video search returned no trailer"),
                Err(e) => warn!(
                    operation = "trailer_lookup",
                    title = %title,
                    error = %e,
                    "Video search failed"
                ),
            }
        }

        if !self.demo_fallback {
            return None;
        }
        Some(fallback_for(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeSearch {
        result: Result<Option<&'static str>, u16>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeSearch {
        fn new(result: Result<Option<&'static str>, u16>) -> Arc<Self> {
            Arc::new(Self {
                result,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VideoSearch for FakeSearch {
        async fn first_video_id(&self, query: &str) -> Result<Option<String>, SourceError> {
            self.queries.lock().unwrap().push(query.to_string());
            match self.result {
                Ok(id) => Ok(id.map(str::to_string)),
                Err(status) => Err(SourceError::Status {
                    service: "youtube",
                    status,
                    body: "quotaExceeded".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_search_hit_wins() {
        let search = FakeSearch::new(Ok(Some("abc123")));
        let resolver = TrailerResolver::new(Some(search.clone()), true);

        let url = resolver.resolve("Batman Begins").await;

        assert_eq!(url.as_deref(), Some("https://www.youtube.com/embed/abc123"));
        assert_eq!(*search.queries.lock().unwrap(), vec!["Batman Begins trailer"]);
    }

    #[tokio::test]
    async fn test_failed_search_uses_table() {
        let resolver = TrailerResolver::new(Some(FakeSearch::new(Err(403))), true);

        let url = resolver.resolve("The Dark Knight Rises").await;

        // "batman" is not in the title; "the dark knight" is
        assert_eq!(url, Some(embed_url("EXeTwQWrcwY")));
    }

    #[tokio::test]
    async fn test_table_order_decides_ties() {
        let resolver = TrailerResolver::new(None, true);
        // Both "avengers" and "spider man" match; the earlier entry wins
        let url = resolver.resolve("Spider Man meets the Avengers").await;
        assert_eq!(url, Some(embed_url("TcMBFSGVi1c")));
    }

    #[tokio::test]
    async fn test_no_match_uses_default() {
        let resolver = TrailerResolver::new(Some(FakeSearch::new(Ok(None))), true);
        let url = resolver.resolve("Paddington 2").await;
        assert_eq!(url, Some(embed_url(DEFAULT_TRAILER)));
    }

    #[tokio::test]
    async fn test_disabled_fallback_returns_none() {
        let resolver = TrailerResolver::new(Some(FakeSearch::new(Err(500))), false);
        assert_eq!(resolver.resolve("Inception").await, None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("https://www.youtube.com/embed/YoHD9XEInc0"),
            "https://www.youtube.com/watch?v=YoHD9XEInc0"
        );
        assert_eq!(watch_url("YoHD9XEInc0"), "https://www.youtube.com/watch?v=YoHD9XEInc0");
    }
}

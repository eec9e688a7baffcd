use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::VideoSearch;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoRef,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

/// First video id in a YouTube Data v3 search response
pub fn parse_first_video_id(body: &str) -> Result<Option<String>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .find_map(|item| item.id.video_id)
        .filter(|id| !id.is_empty()))
}

/// YouTube Data API v3 video search
pub struct YoutubeSearch {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeSearch {
    pub fn new(api_key: String, base_url: String) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingKey("YouTube"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl VideoSearch for YoutubeSearch {
    async fn first_video_id(&self, query: &str) -> Result<Option<String>, SourceError> {
        let params = [
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", "1"),
            ("key", self.api_key.as_str()),
        ];

        debug!(query = %query, "Searching videos");
        let response = self.client.get(&self.base_url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: "youtube",
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_first_video_id(&body)
    }
}

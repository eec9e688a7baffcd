use reelbox_models::{CatalogDetails, CatalogItem, MediaType};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::SearchPage;

/// OMDb only serves pages 1 through 100
pub const MAX_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<CatalogItem>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

fn is_success(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("true")
}

pub fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_PAGE)
}

/// Parse a `?s=` search response
pub fn parse_search(body: &str, page: u32) -> Result<SearchPage, SourceError> {
    let response: OmdbSearchResponse = serde_json::from_str(body)?;

    if !is_success(&response.response) {
        return Err(SourceError::Api(
            response.error.unwrap_or_else(|| "Failed to fetch movies".to_string()),
        ));
    }

    let total_results = response
        .total_results
        .as_deref()
        .and_then(|t| t.trim().parse::<u32>().ok())
        .unwrap_or(response.search.len() as u32);

    Ok(SearchPage {
        items: response.search,
        total_results,
        page,
    })
}

/// Parse an `?i=` lookup response; a negative response means the id is unknown
pub fn parse_details(body: &str) -> Result<Option<CatalogDetails>, SourceError> {
    let mut value: Value = serde_json::from_str(body)?;

    let flag = value
        .get("Response")
        .and_then(Value::as_str)
        .unwrap_or("False")
        .to_string();
    if !is_success(&flag) {
        let error = value.get("Error").and_then(Value::as_str).unwrap_or("unknown error");
        debug!("Catalog lookup returned no title: {}", error);
        return Ok(None);
    }

    if let Some(object) = value.as_object_mut() {
        object.remove("Response");
    }
    Ok(Some(serde_json::from_value(value)?))
}

async fn get_text(
    client: &Client,
    base_url: &str,
    params: &[(&str, String)],
) -> Result<String, SourceError> {
    let response = client.get(base_url).query(params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            service: "omdb",
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}

pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    term: &str,
    page: u32,
    kind: Option<&MediaType>,
) -> Result<SearchPage, SourceError> {
    let page = clamp_page(page);
    let mut params = vec![
        ("apikey", api_key.to_string()),
        ("s", term.to_string()),
        ("page", page.to_string()),
    ];
    if let Some(kind) = kind {
        params.push(("type", kind.as_str().to_string()));
    }

    debug!(term = %term, page, kind = ?kind, "Searching catalog");
    let body = get_text(client, base_url, &params).await?;
    parse_search(&body, page)
}

pub async fn get_by_id(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<Option<CatalogDetails>, SourceError> {
    let params = [
        ("apikey", api_key.to_string()),
        ("i", id.to_string()),
        ("plot", "full".to_string()),
    ];

    debug!(id = %id, "Fetching catalog details");
    let body = get_text(client, base_url, &params).await?;
    parse_details(&body)
}

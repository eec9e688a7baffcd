use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder the catalog uses for missing values (e.g. posters)
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Movie,
    Series,
    Episode,
    /// Anything the catalog sends that we do not model (e.g. "game")
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Episode => "episode",
            MediaType::Other(other) => other,
        }
    }
}

impl From<String> for MediaType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "movie" => MediaType::Movie,
            "series" => MediaType::Series,
            "episode" => MediaType::Episode,
            _ => MediaType::Other(value),
        }
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.as_str().to_string()
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match MediaType::from(s.to_string()) {
            MediaType::Other(other) => Err(format!(
                "Invalid media type: {}. Use 'movie', 'series', or 'episode'",
                other
            )),
            known => Ok(known),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie/TV record as returned by the catalog API.
///
/// Field names on the wire follow the catalog's own casing so a search result
/// can be stored as-is. Fields we do not interpret are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Poster", default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: None,
            poster: None,
            media_type: None,
            extra: Map::new(),
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    /// Poster URL, skipping the catalog's "N/A" placeholder
    pub fn poster_url(&self) -> Option<&str> {
        self.poster
            .as_deref()
            .filter(|p| !p.is_empty() && *p != NOT_AVAILABLE)
    }

    pub fn is_series(&self) -> bool {
        matches!(self.media_type, Some(MediaType::Series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_result() {
        let json = r#"{
            "Title": "Stranger Things",
            "Year": "2016–2025",
            "imdbID": "tt4574334",
            "Type": "series",
            "Poster": "https://m.media-amazon.com/images/M/poster.jpg"
        }"#;

        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "tt4574334");
        assert_eq!(item.title, "Stranger Things");
        assert_eq!(item.year.as_deref(), Some("2016–2025"));
        assert!(item.is_series());
        assert!(item.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let json = r#"{"imdbID": "tt0133093", "Title": "The Matrix", "Rated": "R", "Metascore": 73}"#;

        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.extra.get("Rated"), Some(&Value::String("R".to_string())));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["Metascore"], 73);
        assert_eq!(back["Rated"], "R");
    }

    #[test]
    fn test_unknown_media_type_is_preserved() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"imdbID": "tt1", "Title": "x", "Type": "game"}"#).unwrap();
        assert_eq!(item.media_type, Some(MediaType::Other("game".to_string())));
        assert_eq!(serde_json::to_value(&item).unwrap()["Type"], "game");
    }

    #[test]
    fn test_poster_placeholder() {
        let item = CatalogItem::new("tt1", "x").with_poster("N/A");
        assert_eq!(item.poster_url(), None);

        let item = CatalogItem::new("tt1", "x").with_poster("https://img/x.jpg");
        assert_eq!(item.poster_url(), Some("https://img/x.jpg"));
    }

    #[test]
    fn test_media_type_from_str() {
        assert_eq!("Movie".parse::<MediaType>(), Ok(MediaType::Movie));
        assert_eq!("series".parse::<MediaType>(), Ok(MediaType::Series));
        assert!("music".parse::<MediaType>().is_err());
    }
}

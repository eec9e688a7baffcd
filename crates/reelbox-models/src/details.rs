use serde::{Deserialize, Serialize};

use crate::media::{CatalogItem, NOT_AVAILABLE};

/// Full catalog record for a single title (lookup by id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogDetails {
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Writer", default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Rated", default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(rename = "Released", default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(rename = "Language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "Awards", default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "BoxOffice", default, skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
    #[serde(rename = "Ratings", default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<SourceRating>,
    #[serde(flatten)]
    pub item: CatalogItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl CatalogDetails {
    /// Drop detail-only fields, keeping what a watchlist entry stores
    pub fn into_item(self) -> CatalogItem {
        self.item
    }

    /// Value of a text field, or `None` for the "N/A" placeholder
    pub fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details() {
        let json = r#"{
            "Title": "The Dark Knight",
            "Year": "2008",
            "Rated": "PG-13",
            "Released": "18 Jul 2008",
            "Runtime": "152 min",
            "Genre": "Action, Crime, Drama",
            "Director": "Christopher Nolan",
            "Plot": "When the menace known as the Joker wreaks havoc...",
            "Ratings": [
                {"Source": "Internet Movie Database", "Value": "9.0/10"},
                {"Source": "Metacritic", "Value": "84/100"}
            ],
            "Metascore": "84",
            "imdbRating": "9.0",
            "imdbID": "tt0468569",
            "Type": "movie",
            "BoxOffice": "N/A"
        }"#;

        let details: CatalogDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.item.id, "tt0468569");
        assert_eq!(details.item.title, "The Dark Knight");
        assert_eq!(details.ratings.len(), 2);
        assert_eq!(CatalogDetails::field(&details.director), Some("Christopher Nolan"));
        assert_eq!(CatalogDetails::field(&details.box_office), None);
        // Detail fields are consumed by the outer struct, not the item's pass-through map
        assert!(!details.item.extra.contains_key("Plot"));
        assert!(details.item.extra.contains_key("Metascore"));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::MediaType;

/// Browse rows backed by fixed catalog search terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Popular,
    TopRated,
    NowPlaying,
    Tv,
    Movie,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Popular,
        Category::TopRated,
        Category::NowPlaying,
        Category::Tv,
        Category::Movie,
    ];

    pub fn search_term(self) -> &'static str {
        match self {
            Category::Popular => "marvel",
            Category::TopRated => "star wars",
            Category::NowPlaying => "2023",
            Category::Tv => "series",
            Category::Movie => "movie",
        }
    }

    /// Type restriction sent with the search, if any
    pub fn media_type(self) -> Option<MediaType> {
        match self {
            Category::Tv => Some(MediaType::Series),
            Category::Movie => Some(MediaType::Movie),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::TopRated => "top-rated",
            Category::NowPlaying => "now-playing",
            Category::Tv => "tv",
            Category::Movie => "movie",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Popular => "Popular",
            Category::TopRated => "Top Rated",
            Category::NowPlaying => "Now Playing",
            Category::Tv => "TV Shows",
            Category::Movie => "Movies",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "popular" => Ok(Category::Popular),
            "top-rated" | "toprated" => Ok(Category::TopRated),
            "now-playing" | "nowplaying" => Ok(Category::NowPlaying),
            "tv" => Ok(Category::Tv),
            "movie" => Ok(Category::Movie),
            _ => Err(format!(
                "Invalid category: {}. Use one of: popular, top-rated, now-playing, tv, movie",
                s
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

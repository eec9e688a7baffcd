use reelbox_models::Category;
use tracing::warn;

use crate::error::SourceError;
use crate::traits::{CatalogSource, SearchPage};

/// Rows shown on the home screen, in display order
pub const HOME_ROWS: [Category; 4] = [
    Category::Popular,
    Category::TopRated,
    Category::NowPlaying,
    Category::Tv,
];

#[derive(Debug)]
pub struct FeedRow {
    pub category: Category,
    pub result: Result<SearchPage, SourceError>,
}

/// Fetch every home row concurrently. A failing row keeps its error and
/// does not affect the others.
pub async fn home_feed(source: &dyn CatalogSource) -> Vec<FeedRow> {
    let [popular, top_rated, now_playing, tv] = HOME_ROWS;

    let (popular_result, top_rated_result, now_playing_result, tv_result) = futures::join!(
        source.search_by_category(popular, 1),
        source.search_by_category(top_rated, 1),
        source.search_by_category(now_playing, 1),
        source.search_by_category(tv, 1),
    );

    let rows = vec![
        FeedRow { category: popular, result: popular_result },
        FeedRow { category: top_rated, result: top_rated_result },
        FeedRow { category: now_playing, result: now_playing_result },
        FeedRow { category: tv, result: tv_result },
    ];

    for row in &rows {
        if let Err(e) = &row.result {
            warn!(
                operation = "home_feed",
                category = row.category.key(),
                error = %e,
                "Failed to load row"
            );
        }
    }

    rows
}

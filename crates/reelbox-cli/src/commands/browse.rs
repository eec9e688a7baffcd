use super::ui::{self, Spinner};
use super::Session;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use reelbox_core::{JsonFileStore, Watchlist};
use reelbox_models::{CatalogDetails, Category, MediaType};
use reelbox_sources::{create_trailer_resolver, home_feed, watch_url, SearchPage};
use serde_json::json;

/// OMDb serves ten results per page
const PAGE_SIZE: u32 = 10;

pub async fn run_home(output: &Output) -> Result<()> {
    let session = Session::load()?;
    let catalog = session.catalog()?;
    let watchlist = session.open_watchlist();

    let rows = {
        let _spinner = Spinner::start("Loading home feed...", output);
        home_feed(catalog.as_ref()).await
    };

    if !output.is_human() {
        let rows: Vec<_> = rows
            .iter()
            .map(|row| match &row.result {
                Ok(page) => json!({ "category": row.category.key(), "items": page.items }),
                Err(e) => json!({ "category": row.category.key(), "error": e.to_string() }),
            })
            .collect();
        output.json(&json!({ "rows": rows }));
        return Ok(());
    }

    for row in &rows {
        ui::section(row.category.label(), output);
        match &row.result {
            Ok(page) if page.items.is_empty() => output.info("Nothing here right now."),
            Ok(page) => {
                let table = ui::items_table(&page.items, |id| watchlist.contains(id));
                output.println(table.to_string());
            }
            Err(e) => output.warn(format!("Could not load {}: {}", row.category.label(), e)),
        }
    }
    Ok(())
}

pub async fn run_search(
    term: &str,
    page: u32,
    kind: Option<MediaType>,
    output: &Output,
) -> Result<()> {
    let session = Session::load()?;
    let catalog = session.catalog()?;

    let result = {
        let _spinner = Spinner::start(format!("Searching for \"{}\"...", term), output);
        catalog.search(term, page, kind).await
    }
    .map_err(|e| eyre!("Search failed: {}", e))?;

    print_page(&format!("Results for \"{}\"", term), &result, &session.open_watchlist(), output);
    Ok(())
}

pub async fn run_browse(category: Category, page: u32, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let catalog = session.catalog()?;

    let result = {
        let _spinner = Spinner::start(format!("Loading {}...", category.label()), output);
        catalog.search_by_category(category, page).await
    }
    .map_err(|e| eyre!("Failed to load {}: {}", category.label(), e))?;

    print_page(category.label(), &result, &session.open_watchlist(), output);
    Ok(())
}

pub async fn run_tv(term: Option<String>, page: u32, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let catalog = session.catalog()?;
    let term = term.unwrap_or_else(|| Category::Tv.search_term().to_string());

    let result = {
        let _spinner = Spinner::start("Loading TV shows...", output);
        catalog.tv_shows(&term, page).await
    }
    .map_err(|e| eyre!("Failed to load TV shows: {}", e))?;

    print_page(&format!("TV shows for \"{}\"", term), &result, &session.open_watchlist(), output);
    Ok(())
}

pub async fn run_details(id: &str, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let catalog = session.catalog()?;

    let details = {
        let _spinner = Spinner::start(format!("Fetching {}...", id), output);
        catalog.get_by_id(id).await
    }
    .map_err(|e| eyre!("Failed to fetch details: {}", e))?
    .ok_or_else(|| eyre!("No title found with id {}", id))?;

    let watchlist = session.open_watchlist();
    let entry = watchlist.get(id);

    if !output.is_human() {
        output.json(&json!({
            "details": details,
            "in_watchlist": entry.is_some(),
            "watched": entry.map(|e| e.watched).unwrap_or(false),
        }));
        return Ok(());
    }

    ui::section(&details_heading(&details), output);
    output.println(details_table(&details).to_string());

    if let Some(plot) = CatalogDetails::field(&details.plot) {
        output.println(format!("\n{}", plot));
    }
    match entry {
        Some(entry) if entry.watched => output.info("\nOn your watchlist (watched)."),
        Some(_) => output.info("\nOn your watchlist."),
        None => output.info(format!("\nSave it with: reelbox watchlist add {}", details.item.id)),
    }
    Ok(())
}

pub async fn run_trailer(title: &str, no_fallback: bool, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let trailers = &session.config.trailers;
    let resolver =
        create_trailer_resolver(trailers).with_fallback(trailers.demo_fallback && !no_fallback);

    let trailer = {
        let _spinner = Spinner::start(format!("Looking up trailer for \"{}\"...", title), output);
        resolver.resolve(title).await
    };

    match trailer {
        Some(embed) => {
            if output.is_human() {
                output.success(format!("Trailer for \"{}\": {}", title, watch_url(&embed)));
                output.info(format!("Embed: {}", embed));
            } else {
                output.json(&json!({
                    "title": title,
                    "embed_url": embed,
                    "watch_url": watch_url(&embed),
                }));
            }
        }
        None => output.warn(format!("No trailer found for \"{}\"", title)),
    }
    Ok(())
}

fn print_page(
    heading: &str,
    page: &SearchPage,
    watchlist: &Watchlist<JsonFileStore>,
    output: &Output,
) {
    if !output.is_human() {
        output.data(page);
        return;
    }

    ui::section(heading, output);
    if page.items.is_empty() {
        output.info("No results.");
        return;
    }

    output.println(ui::items_table(&page.items, |id| watchlist.contains(id)).to_string());
    let pages = page.total_results.div_ceil(PAGE_SIZE).max(1);
    output.info(format!("Page {} of {} ({} results)", page.page, pages, page.total_results));
}

fn details_heading(details: &CatalogDetails) -> String {
    match details.item.year.as_deref() {
        Some(year) => format!("{} ({})", details.item.title, year),
        None => details.item.title.clone(),
    }
}

fn details_table(details: &CatalogDetails) -> comfy_table::Table {
    let mut table = ui::new_table();
    let fields = [
        ("Type", details.item.media_type.as_ref().map(|t| t.as_str())),
        ("Rated", CatalogDetails::field(&details.rated)),
        ("Released", CatalogDetails::field(&details.released)),
        ("Runtime", CatalogDetails::field(&details.runtime)),
        ("Genre", CatalogDetails::field(&details.genre)),
        ("Director", CatalogDetails::field(&details.director)),
        ("Writer", CatalogDetails::field(&details.writer)),
        ("Actors", CatalogDetails::field(&details.actors)),
        ("Language", CatalogDetails::field(&details.language)),
        ("Country", CatalogDetails::field(&details.country)),
        ("Awards", CatalogDetails::field(&details.awards)),
        ("IMDb rating", CatalogDetails::field(&details.imdb_rating)),
        ("IMDb votes", CatalogDetails::field(&details.imdb_votes)),
        ("Box office", CatalogDetails::field(&details.box_office)),
        ("Poster", details.item.poster_url()),
        ("IMDb ID", Some(details.item.id.as_str())),
    ];

    for (label, value) in fields {
        if let Some(value) = value {
            table.add_row(vec![ui::header_cell(label), Cell::new(value)]);
        }
    }
    for rating in &details.ratings {
        table.add_row(vec![ui::header_cell(&rating.source), Cell::new(&rating.value)]);
    }
    table
}

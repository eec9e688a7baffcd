use super::ui::{self, Spinner};
use super::Session;
use crate::output::Output;
use crate::WatchlistCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use reelbox_models::WatchFilter;
use serde_json::json;

pub async fn run_watchlist(cmd: WatchlistCommands, output: &Output) -> Result<()> {
    let session = Session::load()?;

    match cmd {
        WatchlistCommands::List { filter } => list(&session, filter, output),
        WatchlistCommands::Add { id } => add(&session, &id, output).await,
        WatchlistCommands::Remove { id } => remove(&session, &id, output),
        WatchlistCommands::Toggle { id } => toggle(&session, &id, output),
    }
}

fn list(session: &Session, filter: WatchFilter, output: &Output) -> Result<()> {
    let watchlist = session.open_watchlist();
    let counts = watchlist.counts();

    if !output.is_human() {
        let entries: Vec<_> = watchlist.list(filter).collect();
        output.json(&json!({
            "filter": filter.as_str(),
            "counts": {
                "total": counts.total,
                "watched": counts.watched,
                "unwatched": counts.unwatched,
            },
            "entries": entries,
        }));
        return Ok(());
    }

    if watchlist.is_empty() {
        output.info("Your watchlist is empty. Save a title with: reelbox watchlist add <imdb-id>");
        return Ok(());
    }

    let mut table = ui::new_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Title"),
        ui::header_cell("Year"),
        ui::header_cell("Type"),
        ui::header_cell("Added"),
        ui::header_cell("Watched"),
        ui::header_cell("IMDb ID"),
    ]);

    let mut shown = 0;
    for (index, entry) in watchlist.list(filter).enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&entry.item.title),
            Cell::new(entry.item.year.as_deref().unwrap_or("-")),
            Cell::new(entry.item.media_type.as_ref().map(|t| t.as_str()).unwrap_or("-")),
            Cell::new(entry.added_at.with_timezone(&chrono::Local).format("%Y-%m-%d")),
            Cell::new(if entry.watched { "✓" } else { "" }),
            Cell::new(entry.id()),
        ]);
        shown += 1;
    }

    ui::section(&format!("Watchlist ({})", filter), output);
    if shown == 0 {
        output.info(format!("No {} titles.", filter.as_str()));
    } else {
        output.println(table.to_string());
    }
    output.info(format!(
        "{} saved, {} watched, {} to watch",
        counts.total, counts.watched, counts.unwatched
    ));
    Ok(())
}

async fn add(session: &Session, id: &str, output: &Output) -> Result<()> {
    let mut watchlist = session.open_watchlist();

    if let Some(entry) = watchlist.get(id) {
        output.info(format!("\"{}\" is already on your watchlist", entry.item.title));
        return Ok(());
    }

    let catalog = session.catalog()?;
    let details = {
        let _spinner = Spinner::start(format!("Fetching {}...", id), output);
        catalog.get_by_id(id).await
    }
    .map_err(|e| eyre!("Failed to fetch {}: {}", id, e))?
    .ok_or_else(|| eyre!("No title found with id {}", id))?;

    let item = details.into_item();
    let title = item.title.clone();
    watchlist
        .add(item)
        .map_err(|e| eyre!("Failed to save watchlist: {}", e))?;

    output.success(format!("Added \"{}\" to your watchlist", title));
    Ok(())
}

fn remove(session: &Session, id: &str, output: &Output) -> Result<()> {
    let mut watchlist = session.open_watchlist();
    let title = watchlist.get(id).map(|entry| entry.item.title.clone());

    let removed = watchlist
        .remove(id)
        .map_err(|e| eyre!("Failed to save watchlist: {}", e))?;

    match (removed, title) {
        (true, Some(title)) => output.success(format!("Removed \"{}\" from your watchlist", title)),
        _ => output.warn(format!("{} is not on your watchlist", id)),
    }
    Ok(())
}

fn toggle(session: &Session, id: &str, output: &Output) -> Result<()> {
    let mut watchlist = session.open_watchlist();

    let watched = watchlist
        .toggle_watched(id)
        .map_err(|e| eyre!("Failed to save watchlist: {}", e))?;

    let title = watchlist
        .get(id)
        .map(|entry| entry.item.title.as_str())
        .unwrap_or(id);
    match watched {
        Some(true) => output.success(format!("Marked \"{}\" as watched", title)),
        Some(false) => output.success(format!("Marked \"{}\" as not watched", title)),
        None => output.warn(format!("{} is not on your watchlist", id)),
    }
    Ok(())
}

use crate::output::Output;
use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use reelbox_models::CatalogItem;
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a request is in flight; cleared when dropped
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, output: &Output) -> Self {
        let message = message.into();

        if !is_interactive() || !output.is_human() || output.is_quiet() {
            tracing::debug!(operation = "progress", message = %message, "Progress update");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn header_cell(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

pub fn section(title: &str, output: &Output) {
    output.println(format!("\n{}", title.bright_cyan().bold()));
}

/// Result rows with a marker for titles already on the watchlist
pub fn items_table<'a>(
    items: impl IntoIterator<Item = &'a CatalogItem>,
    saved: impl Fn(&str) -> bool,
) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Title"),
        header_cell("Year"),
        header_cell("Type"),
        header_cell("IMDb ID"),
        header_cell("Saved"),
    ]);

    for (index, item) in items.into_iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.title),
            Cell::new(item.year.as_deref().unwrap_or("-")),
            Cell::new(item.media_type.as_ref().map(|t| t.as_str()).unwrap_or("-")),
            Cell::new(&item.id),
            Cell::new(if saved(&item.id) { "★" } else { "" }),
        ]);
    }
    table
}

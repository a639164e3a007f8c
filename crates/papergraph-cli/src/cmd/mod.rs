//! Subcommands

pub mod export;
pub mod load;
pub mod process;
pub mod related;
pub mod seed;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use papergraph_db::Database;

use crate::config::Config;

/// Rounded table with cyan headers
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn open_database(config: &Config) -> anyhow::Result<Database> {
    log::debug!("opening {}", config.database.path.display());
    Database::open(&config.database.path)
}

pub fn print_config(config: &Config) {
    let mut table = table(&["Setting", "Value"]);
    table.add_row(vec![
        "Database",
        &config.database.path.display().to_string(),
    ]);
    table.add_row(vec![
        "Public directory",
        &config.output.public_dir.display().to_string(),
    ]);
    table.add_row(vec!["arXiv base URL", &config.arxiv.base_url]);
    table.add_row(vec!["S2 API URL", &config.s2.api_url]);
    table.add_row(vec![
        "S2 API key",
        if config.s2.api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
    table.add_row(vec![
        "Retry delay",
        &format!("{}ms", config.http.retry_delay_ms),
    ]);
    eprintln!("\n{table}");
}

use std::path::Path;

use anyhow::{Context, Result};
use larder_core::{detect_columns, load_path, Column, LoadOptions, Table};
use larder_server::db;
use larder_server::pg_catalog::PgCatalog;

pub fn load(path: &Path, replace: bool, database_url: &str) -> Result<()> {
    let pool = db::create_pool(database_url)?;
    let catalog = PgCatalog::new(pool);
    tracing::info!(path = %path.display(), replace, "loading into postgres catalog");

    let report = load_path(&catalog, path, LoadOptions { replace })
        .with_context(|| format!("Failed to load {}", path.display()))?;

    tracing::info!(
        recipes = report.recipes_inserted,
        ingredient_links = report.ingredient_link_count,
        tag_links = report.tag_link_count,
        "load finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn columns(path: &Path) -> Result<()> {
    let table =
        Table::open(path).with_context(|| format!("Failed to read {}", path.display()))?;

    println!("{} rows", table.len());
    for line in column_report(&table) {
        println!("{}", line);
    }
    Ok(())
}

fn column_report(table: &Table) -> Vec<String> {
    detect_columns(table.columns())
        .iter()
        .map(|(field, column)| match column {
            Column::Mapped { index, name } => {
                format!("{:<12} <- {} (column {})", field, name, index + 1)
            }
            Column::Unmapped => format!("{:<12} <- (unmapped)", field),
        })
        .collect()
}

use std::path::Path;

use anyhow::{bail, Context, Result};
use larder_core::{load_path, rank, CatalogStore, LoadOptions, MemoryCatalog};
use larder_server::db;
use larder_server::pg_catalog::PgCatalog;

fn postgres(database_url: &str) -> Result<PgCatalog> {
    let pool = db::create_pool(database_url)?;
    Ok(PgCatalog::new(pool))
}

pub fn search(
    ingredients: &[String],
    tags: &[String],
    limit: usize,
    file: Option<&Path>,
    database_url: Option<&str>,
) -> Result<()> {
    let catalog: Box<dyn CatalogStore> = match (file, database_url) {
        (Some(path), _) => {
            let catalog = MemoryCatalog::new();
            load_path(&catalog, path, LoadOptions::default())
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Box::new(catalog)
        }
        (None, Some(url)) => Box::new(postgres(url)?),
        (None, None) => bail!("Pass --file or set DATABASE_URL"),
    };

    let results = rank(catalog.as_ref(), ingredients, tags, limit)?;
    tracing::info!(
        backend = catalog.backend_name(),
        results = results.len(),
        "search finished"
    );
    if results.is_empty() {
        tracing::warn!("no matching recipes");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub fn show(id: i64, database_url: &str) -> Result<()> {
    let catalog = postgres(database_url)?;
    match catalog.get_recipe(id)? {
        Some(recipe) => {
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        None => bail!("Recipe {} not found", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_search_against_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.csv");
        fs::write(&path, "Title,Ingredients\nOmelette,\"eggs, milk\"\n").unwrap();

        let ingredients = vec!["eggs".to_string()];
        search(&ingredients, &[], 5, Some(&path), None).unwrap();
    }

    #[test]
    fn test_search_needs_a_source() {
        let err = search(&["eggs".to_string()], &[], 5, None, None).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}

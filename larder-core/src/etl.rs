//! Spreadsheet to catalog loader.
//!
//! Rows are turned into recipe records up front (column sniffing, cell
//! parsing, normalization), then written to the catalog in a single write
//! unit so a failure part way through leaves the catalog unchanged.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::catalog::{CatalogStore, CatalogWriter};
use crate::cells::{clean_display, parse_duration, parse_list_cell, parse_steps_cell};
use crate::columns::{detect_columns, ColumnMap, Field};
use crate::error::{CatalogError, LoadError};
use crate::measure::measure;
use crate::normalize::normalize;
use crate::table::{Cell, Table};
use crate::types::{IngredientEntry, LinkFields, LinkTarget, NewRecipe, TagEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Remove every existing recipe before inserting. Bookmarks survive.
    pub replace: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub recipes_inserted: u64,
    pub ingredient_link_count: u64,
    pub tag_link_count: u64,
}

/// A row ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecipe {
    pub recipe: NewRecipe,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<TagEntry>,
}

/// Read the table at `path` and load it.
pub fn load_path(
    store: &dyn CatalogStore,
    path: impl AsRef<Path>,
    options: LoadOptions,
) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let table = Table::open(path)?;
    tracing::info!(path = %path.display(), rows = table.len(), "read recipe table");
    Ok(load(store, &table, options)?)
}

/// Load every row of `table` into the catalog.
pub fn load(
    store: &dyn CatalogStore,
    table: &Table,
    options: LoadOptions,
) -> Result<LoadReport, CatalogError> {
    let prepared = prepare(table);

    tracing::info!(
        recipes = prepared.len(),
        replace = options.replace,
        backend = store.backend_name(),
        "loading recipes"
    );

    let mut report = LoadReport::default();
    store.write(&mut |writer| {
        report = write_recipes(writer, &prepared, options)?;
        Ok(())
    })?;

    tracing::info!(
        recipes_inserted = report.recipes_inserted,
        ingredient_links = report.ingredient_link_count,
        tag_links = report.tag_link_count,
        "load complete"
    );
    Ok(report)
}

/// Turn every row into a recipe record without touching any store.
///
/// External ids repeated within the table are kept on the first row only.
pub fn prepare(table: &Table) -> Vec<PreparedRecipe> {
    let columns = detect_columns(table.columns());
    for (field, column) in columns.iter() {
        tracing::debug!(field = %field, column = ?column, "column mapping");
    }

    let mut seen_ids = HashSet::new();
    (0..table.len())
        .map(|row| {
            let mut prepared = prepare_row(table, &columns, row);
            if let Some(external_id) = prepared.recipe.external_id.take() {
                if seen_ids.insert(external_id.clone()) {
                    prepared.recipe.external_id = Some(external_id);
                } else {
                    tracing::warn!(
                        row = row + 1,
                        external_id = %external_id,
                        "duplicate external id, dropping it from this row"
                    );
                }
            }
            prepared
        })
        .collect()
}

fn prepare_row(table: &Table, columns: &ColumnMap, row: usize) -> PreparedRecipe {
    let unmapped = Cell::Empty;
    let cell = |field: Field| match columns.get(field).index() {
        Some(index) => table.cell(row, index),
        None => &unmapped,
    };

    let title = text_field(cell(Field::Title)).unwrap_or_else(|| format!("Recipe {}", row + 1));

    let recipe = NewRecipe {
        external_id: text_field(cell(Field::Id)),
        title,
        description: text_field(cell(Field::Description)),
        image_url: text_field(cell(Field::Image)),
        prep_time_min: parse_duration(cell(Field::PrepTime)),
        cuisine: text_field(cell(Field::Cuisine)),
        source_url: text_field(cell(Field::Source)),
        steps: parse_steps_cell(cell(Field::Steps)),
    };

    let ingredients = keyed_entries(cell(Field::Ingredients))
        .map(|(display, normalized)| IngredientEntry {
            display,
            normalized,
        })
        .collect();
    let tags = keyed_entries(cell(Field::Tags))
        .map(|(display, normalized)| TagEntry {
            display,
            normalized,
            kind: None,
        })
        .collect();

    PreparedRecipe {
        recipe,
        ingredients,
        tags,
    }
}

fn text_field(cell: &Cell) -> Option<String> {
    let text = clean_display(&cell.to_string());
    (!text.is_empty()).then_some(text)
}

/// `(display, normalized)` pairs from a list cell. Entries that normalize to
/// nothing are dropped; the first display wins for a repeated key.
fn keyed_entries(cell: &Cell) -> impl Iterator<Item = (String, String)> {
    let mut seen = HashSet::new();
    parse_list_cell(cell).into_iter().filter_map(move |raw| {
        let normalized = normalize(&raw);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            return None;
        }
        Some((clean_display(&raw), normalized))
    })
}

fn write_recipes(
    writer: &mut dyn CatalogWriter,
    prepared: &[PreparedRecipe],
    options: LoadOptions,
) -> Result<LoadReport, CatalogError> {
    let mut report = LoadReport::default();

    if options.replace {
        let removed = writer.clear_recipes()?;
        tracing::info!(removed, "cleared existing recipes");
    }

    for item in prepared {
        let recipe_id = writer.insert_recipe(&item.recipe)?;
        report.recipes_inserted += 1;

        for (position, entry) in item.ingredients.iter().enumerate() {
            let ingredient_id = writer.upsert_ingredient(&entry.display, &entry.normalized)?;
            let measurement = measure(&entry.display);
            writer.link(
                recipe_id,
                LinkTarget::Ingredient(ingredient_id),
                &LinkFields {
                    position: position_of(position),
                    raw_text: Some(entry.display.clone()),
                    quantity: measurement.quantity,
                    unit: measurement.unit,
                },
            )?;
            report.ingredient_link_count += 1;
        }

        for (position, tag) in item.tags.iter().enumerate() {
            let tag_id = writer.upsert_tag(&tag.display, &tag.normalized, tag.kind.as_deref())?;
            writer.link(
                recipe_id,
                LinkTarget::Tag(tag_id),
                &LinkFields {
                    position: position_of(position),
                    ..Default::default()
                },
            )?;
            report.tag_link_count += 1;
        }
    }

    Ok(report)
}

fn position_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

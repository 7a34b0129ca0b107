//! End-to-end tests: spreadsheet in, ranked matches out.

use std::fs;
use std::path::PathBuf;

use larder_core::{
    load, load_path, rank, CatalogStore, Cell, LoadError, LoadOptions, MemoryCatalog, Table,
    TableError,
};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn titles(matches: &[larder_core::RecipeMatch]) -> Vec<&str> {
    matches.iter().map(|m| m.title.as_str()).collect()
}

#[test]
fn test_omelette_round_trip() {
    let catalog = MemoryCatalog::new();
    let table = Table::new(
        vec![
            "title".to_string(),
            "ingredients".to_string(),
            "prep".to_string(),
        ],
        vec![vec![
            Cell::text("Omelette"),
            Cell::text("Eggs, Milk"),
            Cell::text("PT10M"),
        ]],
    );
    load(&catalog, &table, LoadOptions::default()).unwrap();

    let results = rank(&catalog, &["eggs"], &[] as &[&str], 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Omelette");
    assert_eq!(results[0].match_count, 1);
    assert_eq!(results[0].match_pct, 0.5);
    assert_eq!(results[0].prep_time_min, Some(10));
}

#[test]
fn test_load_csv_then_search() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "recipes.csv",
        "Recipe ID,Recipe Name,Cuisine,Total Time,Ingredients,Tags,Instructions\n\
         r1,Tomato Soup,Italian,30 min,\"Fresh Tomatoes, Onions, garlic, salt\",\"vegan, soup\",\"1. Chop\n2. Simmer\"\n\
         r2,Bruschetta,Italian,PT15M,\"['tomatoes', 'bread', 'basil']\",vegan,Toast; Top\n\
         r3,Garlic Bread,,0:20,\"bread; butter; garlic\",,Spread and bake\n",
    );

    let catalog = MemoryCatalog::new();
    let report = load_path(&catalog, &path, LoadOptions::default()).unwrap();
    assert_eq!(report.recipes_inserted, 3);
    assert_eq!(report.ingredient_link_count, 10);
    assert_eq!(report.tag_link_count, 3);

    let results = rank(&catalog, &["tomato", "BREAD"], &[] as &[&str], 10).unwrap();
    assert_eq!(titles(&results), vec!["Bruschetta", "Garlic Bread", "Tomato Soup"]);
    assert_eq!(results[0].match_count, 2);

    let vegan = rank(&catalog, &["tomato", "bread"], &["Vegan"], 10).unwrap();
    assert_eq!(titles(&vegan), vec!["Bruschetta", "Tomato Soup"]);

    let soup = catalog.get_recipe(results[2].recipe_id).unwrap().unwrap();
    assert_eq!(soup.external_id.as_deref(), Some("r1"));
    assert_eq!(soup.cuisine.as_deref(), Some("Italian"));
    assert_eq!(soup.prep_time_min, Some(30));
    assert_eq!(soup.steps, vec!["Chop", "Simmer"]);
    assert_eq!(soup.ingredients[0].display, "Fresh Tomatoes");
    assert_eq!(soup.ingredients[0].normalized, "tomato");
    assert!(soup.normalized_tags.contains("soup"));
}

#[test]
fn test_load_json_keeps_structured_lists() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "recipes.json",
        r#"[
            {"name": "Pad Thai", "ingredients": ["rice noodles", "eggs", "peanuts"], "minutes": 25},
            {"name": "Fried Rice", "ingredients": "rice, eggs, peas", "tags": ["quick"]}
        ]"#,
    );

    let catalog = MemoryCatalog::new();
    load_path(&catalog, &path, LoadOptions::default()).unwrap();

    let results = rank(&catalog, &["eggs", "rice"], &[] as &[&str], 10).unwrap();
    assert_eq!(titles(&results), vec!["Fried Rice", "Pad Thai"]);
    assert_eq!(results[0].match_count, 2);
    assert_eq!(results[1].match_count, 1);
    assert_eq!(results[1].prep_time_min, Some(25));
}

#[test]
fn test_results_respect_limit_and_are_unique() {
    let catalog = MemoryCatalog::new();
    let rows = (0..20)
        .map(|i| {
            let ingredients = match i % 4 {
                0 => "salt",
                1 => "salt, pepper",
                2 => "salt, pepper, oil",
                _ => "pepper, oil, lemon",
            };
            vec![Cell::text(format!("Dish {i}")), Cell::text(ingredients)]
        })
        .collect();
    let table = Table::new(vec!["title".to_string(), "ingredients".to_string()], rows);
    load(&catalog, &table, LoadOptions::default()).unwrap();

    let query = ["salt", "pepper"];
    let first = rank(&catalog, &query, &[] as &[&str], 7).unwrap();
    let second = rank(&catalog, &query, &[] as &[&str], 7).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 7);

    let mut ids: Vec<_> = first.iter().map(|m| m.recipe_id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 7);

    for pair in first.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.match_pct >= b.match_pct);
        if a.match_pct == b.match_pct && a.match_count == b.match_count {
            assert!(a.recipe_id < b.recipe_id);
        }
    }
    for m in &first {
        assert!(m.match_count >= 1);
        assert!(m.match_pct > 0.0 && m.match_pct <= 1.0);
    }
}

#[test]
fn test_unreadable_tables_commit_nothing() {
    let dir = TempDir::new().unwrap();
    let catalog = MemoryCatalog::new();

    let unsupported = write_file(&dir, "recipes.txt", "title\nSoup\n");
    let err = load_path(&catalog, &unsupported, LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Table(TableError::UnsupportedFormat(_))
    ));

    let broken = write_file(&dir, "recipes.json", "{\"title\": \"not an array\"}");
    let err = load_path(&catalog, &broken, LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Table(TableError::Json(_))));

    let missing = dir.path().join("missing.csv");
    assert!(load_path(&catalog, &missing, LoadOptions::default()).is_err());

    assert!(catalog.get_recipe(1).unwrap().is_none());
}

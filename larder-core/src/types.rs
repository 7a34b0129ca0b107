use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type RecipeId = i64;
pub type IngredientId = i64;
pub type TagId = i64;

/// Recipe row as produced by the loader, before ingredients and tags are
/// linked to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub external_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
    pub source_url: Option<String>,
    pub steps: Vec<String>,
}

/// Display text paired with its matching key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub display: String,
    pub normalized: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub display: String,
    pub normalized: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Everything the catalog knows about one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub external_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
    pub source_url: Option<String>,
    pub steps: Vec<String>,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<TagEntry>,
    pub normalized_ingredients: BTreeSet<String>,
    pub normalized_tags: BTreeSet<String>,
}

/// The columns shown next to a ranked match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
}

/// A recipe sharing at least one ingredient with a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecipe {
    pub recipe_id: RecipeId,
    pub normalized_ingredients: BTreeSet<String>,
    pub total_count: usize,
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMatch {
    pub recipe_id: RecipeId,
    pub title: String,
    pub image_url: Option<String>,
    pub prep_time_min: Option<u32>,
    pub cuisine: Option<String>,
    pub match_count: usize,
    pub match_pct: f64,
}

/// What a recipe link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Ingredient(IngredientId),
    Tag(TagId),
}

/// Extra columns carried by a recipe link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFields {
    /// Display order within the recipe.
    pub position: i32,
    pub raw_text: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagMatch {
    /// Recipe must carry every requested tag.
    #[default]
    All,
    /// Recipe must carry at least one requested tag.
    Any,
}

/// Who a bookmark belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkOwner {
    User(String),
    Device(String),
}

//! Recipe catalog storage abstraction.
//!
//! Loading and ranking are written once against these traits. Backends
//! decide how recipes are laid out: normalized tables with joins, or one
//! document per recipe with embedded ingredient and tag arrays.

mod memory;

pub use memory::MemoryCatalog;

use std::collections::BTreeSet;
use std::fmt;

use crate::error::CatalogError;
use crate::types::{
    BookmarkOwner, CandidateRecipe, IngredientId, LinkFields, LinkTarget, NewRecipe, RecipeDetail,
    RecipeId, RecipeSummary, TagId, TagMatch,
};

/// Tag type as stored: a blank type is the same as no type.
pub fn tag_kind(kind: Option<&str>) -> Option<&str> {
    kind.map(str::trim).filter(|k| !k.is_empty())
}

/// Write operations, only available inside [`CatalogStore::write`].
pub trait CatalogWriter {
    /// Remove every recipe and its links. Bookmarks are left alone.
    /// Returns the number of recipes removed.
    fn clear_recipes(&mut self) -> Result<u64, CatalogError>;

    /// Find or create the ingredient with this normalized key.
    fn upsert_ingredient(
        &mut self,
        display: &str,
        normalized: &str,
    ) -> Result<IngredientId, CatalogError>;

    /// Find or create the tag with this normalized key and type. A blank
    /// type is stored as no type (see [`tag_kind`]).
    fn upsert_tag(
        &mut self,
        display: &str,
        normalized: &str,
        kind: Option<&str>,
    ) -> Result<TagId, CatalogError>;

    fn insert_recipe(&mut self, recipe: &NewRecipe) -> Result<RecipeId, CatalogError>;

    fn link(
        &mut self,
        recipe: RecipeId,
        target: LinkTarget,
        fields: &LinkFields,
    ) -> Result<(), CatalogError>;
}

/// A recipe catalog backend.
///
/// Implementations must be safe to share between request handlers. Reads
/// never block on each other; a [`write`](CatalogStore::write) either
/// applies completely or not at all.
pub trait CatalogStore: Send + Sync + fmt::Debug {
    /// Short backend name for logs and health output ("postgres", "memory").
    fn backend_name(&self) -> &'static str;

    /// Cheap reachability check.
    fn ping(&self) -> Result<(), CatalogError>;

    /// Run `f` as one atomic unit of writes.
    fn write(
        &self,
        f: &mut dyn FnMut(&mut dyn CatalogWriter) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError>;

    /// Recipes containing at least one of `keys`, with their full
    /// normalized ingredient set.
    fn find_by_normalized_ingredients(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<Vec<CandidateRecipe>, CatalogError>;

    /// Recipes whose tags match `keys` under `mode`.
    fn find_by_normalized_tags(
        &self,
        keys: &BTreeSet<String>,
        mode: TagMatch,
    ) -> Result<Vec<RecipeId>, CatalogError>;

    /// Summaries for the given ids. Unknown ids are skipped; order is
    /// unspecified.
    fn recipe_summaries(&self, ids: &[RecipeId]) -> Result<Vec<RecipeSummary>, CatalogError>;

    /// Full detail for one recipe, `None` if it does not exist.
    fn get_recipe(&self, id: RecipeId) -> Result<Option<RecipeDetail>, CatalogError>;

    /// Bookmark a recipe. Returns `false` if the owner already had it.
    fn add_bookmark(&self, owner: &BookmarkOwner, recipe: RecipeId)
        -> Result<bool, CatalogError>;

    /// An owner's bookmarked recipe ids, oldest first.
    fn bookmarks(&self, owner: &BookmarkOwner) -> Result<Vec<RecipeId>, CatalogError>;
}

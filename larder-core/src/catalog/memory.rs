//! In-process catalog that keeps one document per recipe.
//!
//! Each recipe carries its own ingredient and tag arrays plus the derived
//! normalized key sets, so matching is plain set intersection. Writes are
//! applied to a copy and swapped in under the write lock, which makes every
//! load atomic for readers.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use super::{tag_kind, CatalogStore, CatalogWriter};
use crate::error::CatalogError;
use crate::types::{
    BookmarkOwner, CandidateRecipe, IngredientEntry, IngredientId, LinkFields, LinkTarget,
    NewRecipe, RecipeDetail, RecipeId, RecipeSummary, TagEntry, TagId, TagMatch,
};

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<CatalogState>,
}

#[derive(Debug, Clone, Default)]
struct CatalogState {
    last_recipe_id: RecipeId,
    recipes: BTreeMap<RecipeId, RecipeDocument>,
    external_ids: HashMap<String, RecipeId>,
    ingredients: Vec<IngredientEntry>,
    ingredient_ids: HashMap<String, IngredientId>,
    tags: Vec<TagEntry>,
    tag_ids: HashMap<(String, Option<String>), TagId>,
    bookmarks: Vec<(BookmarkOwner, RecipeId)>,
}

#[derive(Debug, Clone)]
struct RecipeDocument {
    recipe: NewRecipe,
    ingredients: Vec<(i32, IngredientEntry)>,
    tags: Vec<(i32, TagEntry)>,
    normalized_ingredients: BTreeSet<String>,
    normalized_tags: BTreeSet<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> Result<T, CatalogError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(f(&state))
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Unavailable("memory catalog lock poisoned".to_string())
}

/// Ids are 1-based positions in the dictionary vectors.
fn slot(id: i64, len: usize) -> Option<usize> {
    usize::try_from(id - 1).ok().filter(|&i| i < len)
}

struct MemoryWriter<'a> {
    state: &'a mut CatalogState,
}

impl CatalogWriter for MemoryWriter<'_> {
    fn clear_recipes(&mut self) -> Result<u64, CatalogError> {
        let removed = self.state.recipes.len() as u64;
        self.state.recipes.clear();
        self.state.external_ids.clear();
        Ok(removed)
    }

    fn upsert_ingredient(
        &mut self,
        display: &str,
        normalized: &str,
    ) -> Result<IngredientId, CatalogError> {
        if let Some(&id) = self.state.ingredient_ids.get(normalized) {
            return Ok(id);
        }
        self.state.ingredients.push(IngredientEntry {
            display: display.trim().to_string(),
            normalized: normalized.to_string(),
        });
        let id = self.state.ingredients.len() as IngredientId;
        self.state.ingredient_ids.insert(normalized.to_string(), id);
        Ok(id)
    }

    fn upsert_tag(
        &mut self,
        display: &str,
        normalized: &str,
        kind: Option<&str>,
    ) -> Result<TagId, CatalogError> {
        let key = (normalized.to_string(), tag_kind(kind).map(str::to_string));
        if let Some(&id) = self.state.tag_ids.get(&key) {
            return Ok(id);
        }
        self.state.tags.push(TagEntry {
            display: display.trim().to_string(),
            normalized: normalized.to_string(),
            kind: key.1.clone(),
        });
        let id = self.state.tags.len() as TagId;
        self.state.tag_ids.insert(key, id);
        Ok(id)
    }

    fn insert_recipe(&mut self, recipe: &NewRecipe) -> Result<RecipeId, CatalogError> {
        if let Some(external_id) = &recipe.external_id {
            if self.state.external_ids.contains_key(external_id) {
                return Err(CatalogError::Conflict(format!(
                    "external id {external_id} already exists"
                )));
            }
        }

        self.state.last_recipe_id += 1;
        let id = self.state.last_recipe_id;
        if let Some(external_id) = &recipe.external_id {
            self.state.external_ids.insert(external_id.clone(), id);
        }
        self.state.recipes.insert(
            id,
            RecipeDocument {
                recipe: recipe.clone(),
                ingredients: Vec::new(),
                tags: Vec::new(),
                normalized_ingredients: BTreeSet::new(),
                normalized_tags: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    fn link(
        &mut self,
        recipe: RecipeId,
        target: LinkTarget,
        fields: &LinkFields,
    ) -> Result<(), CatalogError> {
        let state = &mut *self.state;
        let doc = state
            .recipes
            .get_mut(&recipe)
            .ok_or_else(|| CatalogError::Conflict(format!("recipe {recipe} does not exist")))?;

        match target {
            LinkTarget::Ingredient(id) => {
                let entry = slot(id, state.ingredients.len())
                    .map(|i| &state.ingredients[i])
                    .ok_or_else(|| {
                        CatalogError::Conflict(format!("ingredient {id} does not exist"))
                    })?;
                if !doc.normalized_ingredients.insert(entry.normalized.clone()) {
                    return Err(CatalogError::Conflict(format!(
                        "recipe {recipe} already linked to ingredient {id}"
                    )));
                }
                let display = fields
                    .raw_text
                    .clone()
                    .unwrap_or_else(|| entry.display.clone());
                doc.ingredients.push((
                    fields.position,
                    IngredientEntry {
                        display,
                        normalized: entry.normalized.clone(),
                    },
                ));
            }
            LinkTarget::Tag(id) => {
                let entry = slot(id, state.tags.len())
                    .map(|i| &state.tags[i])
                    .ok_or_else(|| CatalogError::Conflict(format!("tag {id} does not exist")))?;
                if doc.tags.iter().any(|(_, t)| t == entry) {
                    return Err(CatalogError::Conflict(format!(
                        "recipe {recipe} already linked to tag {id}"
                    )));
                }
                doc.normalized_tags.insert(entry.normalized.clone());
                doc.tags.push((fields.position, entry.clone()));
            }
        }
        Ok(())
    }
}

impl CatalogStore for MemoryCatalog {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn ping(&self) -> Result<(), CatalogError> {
        self.read(|_| ())
    }

    fn write(
        &self,
        f: &mut dyn FnMut(&mut dyn CatalogWriter) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        let mut guard = self.state.write().map_err(|_| poisoned())?;
        let mut draft = guard.clone();
        f(&mut MemoryWriter { state: &mut draft })?;
        *guard = draft;
        Ok(())
    }

    fn find_by_normalized_ingredients(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<Vec<CandidateRecipe>, CatalogError> {
        self.read(|state| {
            state
                .recipes
                .iter()
                .filter(|(_, doc)| !doc.normalized_ingredients.is_disjoint(keys))
                .map(|(&id, doc)| CandidateRecipe {
                    recipe_id: id,
                    normalized_ingredients: doc.normalized_ingredients.clone(),
                    total_count: doc.normalized_ingredients.len(),
                })
                .collect()
        })
    }

    fn find_by_normalized_tags(
        &self,
        keys: &BTreeSet<String>,
        mode: TagMatch,
    ) -> Result<Vec<RecipeId>, CatalogError> {
        self.read(|state| {
            state
                .recipes
                .iter()
                .filter(|(_, doc)| match mode {
                    TagMatch::All => keys.is_subset(&doc.normalized_tags),
                    TagMatch::Any => !keys.is_disjoint(&doc.normalized_tags),
                })
                .map(|(&id, _)| id)
                .collect()
        })
    }

    fn recipe_summaries(&self, ids: &[RecipeId]) -> Result<Vec<RecipeSummary>, CatalogError> {
        self.read(|state| {
            ids.iter()
                .filter_map(|id| state.recipes.get(id).map(|doc| (*id, doc)))
                .map(|(id, doc)| RecipeSummary {
                    id,
                    title: doc.recipe.title.clone(),
                    image_url: doc.recipe.image_url.clone(),
                    prep_time_min: doc.recipe.prep_time_min,
                    cuisine: doc.recipe.cuisine.clone(),
                })
                .collect()
        })
    }

    fn get_recipe(&self, id: RecipeId) -> Result<Option<RecipeDetail>, CatalogError> {
        self.read(|state| {
            state.recipes.get(&id).map(|doc| {
                let mut ingredients = doc.ingredients.clone();
                ingredients.sort_by_key(|(position, _)| *position);
                let mut tags = doc.tags.clone();
                tags.sort_by_key(|(position, _)| *position);

                let recipe = doc.recipe.clone();
                RecipeDetail {
                    id,
                    external_id: recipe.external_id,
                    title: recipe.title,
                    description: recipe.description,
                    image_url: recipe.image_url,
                    prep_time_min: recipe.prep_time_min,
                    cuisine: recipe.cuisine,
                    source_url: recipe.source_url,
                    steps: recipe.steps,
                    ingredients: ingredients.into_iter().map(|(_, e)| e).collect(),
                    tags: tags.into_iter().map(|(_, t)| t).collect(),
                    normalized_ingredients: doc.normalized_ingredients.clone(),
                    normalized_tags: doc.normalized_tags.clone(),
                }
            })
        })
    }

    fn add_bookmark(
        &self,
        owner: &BookmarkOwner,
        recipe: RecipeId,
    ) -> Result<bool, CatalogError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        if state
            .bookmarks
            .iter()
            .any(|(o, r)| o == owner && *r == recipe)
        {
            return Ok(false);
        }
        state.bookmarks.push((owner.clone(), recipe));
        Ok(true)
    }

    fn bookmarks(&self, owner: &BookmarkOwner) -> Result<Vec<RecipeId>, CatalogError> {
        self.read(|state| {
            state
                .bookmarks
                .iter()
                .filter(|(o, _)| o == owner)
                .map(|(_, r)| *r)
                .collect()
        })
    }
}

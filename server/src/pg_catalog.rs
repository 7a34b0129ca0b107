//! Relational catalog: normalized tables joined and aggregated in Postgres.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use diesel::dsl::count_distinct;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use larder_core::catalog::{tag_kind, CatalogStore, CatalogWriter};
use larder_core::types::{
    BookmarkOwner, CandidateRecipe, IngredientEntry, IngredientId, LinkFields, LinkTarget,
    NewRecipe, RecipeDetail, RecipeId, RecipeSummary, TagEntry, TagId, TagMatch,
};
use larder_core::CatalogError;

use crate::db::DbPool;
use crate::models;
use crate::schema::{bookmarks, ingredients, recipe_ingredients, recipe_tags, recipes, tags};

type PooledConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl fmt::Debug for PgCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCatalog")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConn, CatalogError> {
        self.pool
            .get()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}

fn db_error(err: DieselError) -> CatalogError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CatalogError::Conflict(info.message().to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            CatalogError::Conflict(info.message().to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            CatalogError::Unavailable(info.message().to_string())
        }
        other => CatalogError::Database(other.to_string()),
    }
}

fn to_minutes(value: Option<i32>) -> Option<u32> {
    value.and_then(|m| u32::try_from(m).ok())
}

/// Carries a catalog error out of a diesel transaction closure.
struct WriteError(CatalogError);

impl From<DieselError> for WriteError {
    fn from(err: DieselError) -> Self {
        WriteError(db_error(err))
    }
}

struct PgWriter<'a> {
    conn: &'a mut PgConnection,
}

impl CatalogWriter for PgWriter<'_> {
    fn clear_recipes(&mut self) -> Result<u64, CatalogError> {
        // Link rows go with their recipe through ON DELETE CASCADE.
        let removed = diesel::delete(recipes::table)
            .execute(self.conn)
            .map_err(db_error)?;
        Ok(removed as u64)
    }

    fn upsert_ingredient(
        &mut self,
        display: &str,
        normalized: &str,
    ) -> Result<IngredientId, CatalogError> {
        let existing = ingredients::table
            .filter(ingredients::normalized_name.eq(normalized))
            .select(ingredients::id)
            .first::<i64>(self.conn)
            .optional()
            .map_err(db_error)?;
        if let Some(id) = existing {
            return Ok(id);
        }

        diesel::insert_into(ingredients::table)
            .values(&models::NewIngredient {
                name: display.trim(),
                normalized_name: normalized,
            })
            .returning(ingredients::id)
            .get_result(self.conn)
            .map_err(db_error)
    }

    fn upsert_tag(
        &mut self,
        display: &str,
        normalized: &str,
        kind: Option<&str>,
    ) -> Result<TagId, CatalogError> {
        let kind = tag_kind(kind);
        let existing = tags::table
            .filter(tags::normalized_name.eq(normalized))
            .filter(tags::tag_type.is_not_distinct_from(kind))
            .select(tags::id)
            .first::<i64>(self.conn)
            .optional()
            .map_err(db_error)?;
        if let Some(id) = existing {
            return Ok(id);
        }

        diesel::insert_into(tags::table)
            .values(&models::NewTag {
                name: display.trim(),
                normalized_name: normalized,
                tag_type: kind,
            })
            .returning(tags::id)
            .get_result(self.conn)
            .map_err(db_error)
    }

    fn insert_recipe(&mut self, recipe: &NewRecipe) -> Result<RecipeId, CatalogError> {
        let row = models::NewRecipe {
            external_id: recipe.external_id.as_deref(),
            title: &recipe.title,
            description: recipe.description.as_deref(),
            image_url: recipe.image_url.as_deref(),
            prep_time_min: recipe
                .prep_time_min
                .map(|m| i32::try_from(m).unwrap_or(i32::MAX)),
            cuisine: recipe.cuisine.as_deref(),
            source_url: recipe.source_url.as_deref(),
            steps: &recipe.steps,
        };

        diesel::insert_into(recipes::table)
            .values(&row)
            .returning(recipes::id)
            .get_result(self.conn)
            .map_err(db_error)
    }

    fn link(
        &mut self,
        recipe: RecipeId,
        target: LinkTarget,
        fields: &LinkFields,
    ) -> Result<(), CatalogError> {
        match target {
            LinkTarget::Ingredient(ingredient_id) => {
                diesel::insert_into(recipe_ingredients::table)
                    .values(&models::NewRecipeIngredient {
                        recipe_id: recipe,
                        ingredient_id,
                        position: fields.position,
                        quantity: fields.quantity.as_deref(),
                        unit: fields.unit.as_deref(),
                        raw_text: fields.raw_text.as_deref(),
                    })
                    .execute(self.conn)
                    .map_err(db_error)?;
            }
            LinkTarget::Tag(tag_id) => {
                diesel::insert_into(recipe_tags::table)
                    .values(&models::NewRecipeTag {
                        recipe_id: recipe,
                        tag_id,
                        position: fields.position,
                    })
                    .execute(self.conn)
                    .map_err(db_error)?;
            }
        }
        Ok(())
    }
}

impl CatalogStore for PgCatalog {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn ping(&self) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(db_error)?;
        Ok(())
    }

    fn write(
        &self,
        f: &mut dyn FnMut(&mut dyn CatalogWriter) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        let mut pooled = self.conn()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, WriteError, _>(|conn| {
            f(&mut PgWriter { conn }).map_err(WriteError)
        })
        .map_err(|WriteError(err)| err)
    }

    fn find_by_normalized_ingredients(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<Vec<CandidateRecipe>, CatalogError> {
        let mut conn = self.conn()?;
        let keys: Vec<String> = keys.iter().cloned().collect();

        let matching: Vec<i64> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(ingredients::normalized_name.eq_any(keys))
            .select(recipe_ingredients::recipe_id)
            .distinct()
            .load(&mut conn)
            .map_err(db_error)?;
        if matching.is_empty() {
            return Ok(Vec::new());
        }

        let pairs: Vec<(i64, String)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(matching))
            .select((recipe_ingredients::recipe_id, ingredients::normalized_name))
            .load(&mut conn)
            .map_err(db_error)?;

        let mut grouped: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for (recipe_id, key) in pairs {
            grouped.entry(recipe_id).or_default().insert(key);
        }

        Ok(grouped
            .into_iter()
            .map(|(recipe_id, normalized_ingredients)| CandidateRecipe {
                recipe_id,
                total_count: normalized_ingredients.len(),
                normalized_ingredients,
            })
            .collect())
    }

    fn find_by_normalized_tags(
        &self,
        keys: &BTreeSet<String>,
        mode: TagMatch,
    ) -> Result<Vec<RecipeId>, CatalogError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        let wanted: Vec<String> = keys.iter().cloned().collect();
        let wanted_count = wanted.len() as i64;

        let query = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::normalized_name.eq_any(wanted))
            .group_by(recipe_tags::recipe_id)
            .select(recipe_tags::recipe_id)
            .order(recipe_tags::recipe_id);

        let ids = match mode {
            TagMatch::All => query
                .having(count_distinct(tags::normalized_name).eq(wanted_count))
                .load::<i64>(&mut conn),
            TagMatch::Any => query.load::<i64>(&mut conn),
        };
        ids.map_err(db_error)
    }

    fn recipe_summaries(&self, ids: &[RecipeId]) -> Result<Vec<RecipeSummary>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;

        let rows: Vec<models::RecipeSummaryRow> = recipes::table
            .filter(recipes::id.eq_any(ids.to_vec()))
            .select(models::RecipeSummaryRow::as_select())
            .load(&mut conn)
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| RecipeSummary {
                id: row.id,
                title: row.title,
                image_url: row.image_url,
                prep_time_min: to_minutes(row.prep_time_min),
                cuisine: row.cuisine,
            })
            .collect())
    }

    fn get_recipe(&self, id: RecipeId) -> Result<Option<RecipeDetail>, CatalogError> {
        let mut conn = self.conn()?;

        let Some(recipe) = recipes::table
            .find(id)
            .select(models::Recipe::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        let ingredient_rows: Vec<(String, String, Option<String>)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(id))
            .order((recipe_ingredients::position, recipe_ingredients::ingredient_id))
            .select((
                ingredients::name,
                ingredients::normalized_name,
                recipe_ingredients::raw_text,
            ))
            .load(&mut conn)
            .map_err(db_error)?;

        let tag_rows: Vec<(String, String, Option<String>)> = recipe_tags::table
            .inner_join(tags::table)
            .filter(recipe_tags::recipe_id.eq(id))
            .order((recipe_tags::position, recipe_tags::tag_id))
            .select((tags::name, tags::normalized_name, tags::tag_type))
            .load(&mut conn)
            .map_err(db_error)?;

        let ingredients: Vec<IngredientEntry> = ingredient_rows
            .into_iter()
            .map(|(name, normalized, raw_text)| IngredientEntry {
                display: raw_text.unwrap_or(name),
                normalized,
            })
            .collect();
        let tags: Vec<TagEntry> = tag_rows
            .into_iter()
            .map(|(display, normalized, kind)| TagEntry {
                display,
                normalized,
                kind,
            })
            .collect();

        Ok(Some(RecipeDetail {
            id: recipe.id,
            external_id: recipe.external_id,
            title: recipe.title,
            description: recipe.description,
            image_url: recipe.image_url,
            prep_time_min: to_minutes(recipe.prep_time_min),
            cuisine: recipe.cuisine,
            source_url: recipe.source_url,
            steps: recipe.steps,
            normalized_ingredients: ingredients.iter().map(|e| e.normalized.clone()).collect(),
            normalized_tags: tags.iter().map(|t| t.normalized.clone()).collect(),
            ingredients,
            tags,
        }))
    }

    fn add_bookmark(
        &self,
        owner: &BookmarkOwner,
        recipe: RecipeId,
    ) -> Result<bool, CatalogError> {
        let mut conn = self.conn()?;
        let (user_id, device_key) = owner_columns(owner);

        let inserted = diesel::insert_into(bookmarks::table)
            .values(&models::NewBookmark {
                user_id,
                device_key,
                recipe_id: recipe,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(db_error)?;
        Ok(inserted > 0)
    }

    fn bookmarks(&self, owner: &BookmarkOwner) -> Result<Vec<RecipeId>, CatalogError> {
        let mut conn = self.conn()?;
        let query = bookmarks::table
            .select(bookmarks::recipe_id)
            .order(bookmarks::id)
            .into_boxed();

        let query = match owner {
            BookmarkOwner::User(user_id) => query.filter(bookmarks::user_id.eq(user_id.as_str())),
            BookmarkOwner::Device(key) => query.filter(bookmarks::device_key.eq(key.as_str())),
        };
        query.load(&mut conn).map_err(db_error)
    }
}

fn owner_columns(owner: &BookmarkOwner) -> (Option<&str>, Option<&str>) {
    match owner {
        BookmarkOwner::User(id) => (Some(id.as_str()), None),
        BookmarkOwner::Device(key) => (None, Some(key.as_str())),
    }
}

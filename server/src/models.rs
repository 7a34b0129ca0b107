use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time_min: Option<i32>,
    pub cuisine: Option<String>,
    pub source_url: Option<String>,
    pub steps: Vec<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub external_id: Option<&'a str>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub prep_time_min: Option<i32>,
    pub cuisine: Option<&'a str>,
    pub source_url: Option<&'a str>,
    pub steps: &'a [String],
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeSummaryRow {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub prep_time_min: Option<i32>,
    pub cuisine: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
    pub normalized_name: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
    pub normalized_name: &'a str,
    pub tag_type: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient<'a> {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub position: i32,
    pub quantity: Option<&'a str>,
    pub unit: Option<&'a str>,
    pub raw_text: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: i64,
    pub tag_id: i64,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bookmarks)]
pub struct NewBookmark<'a> {
    pub user_id: Option<&'a str>,
    pub device_key: Option<&'a str>,
    pub recipe_id: i64,
}

diesel::table! {
    bookmarks (id) {
        id -> Int8,
        user_id -> Nullable<Varchar>,
        device_key -> Nullable<Varchar>,
        recipe_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        normalized_name -> Varchar,
    }
}

diesel::table! {
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int8,
        ingredient_id -> Int8,
        position -> Int4,
        quantity -> Nullable<Varchar>,
        unit -> Nullable<Varchar>,
        raw_text -> Nullable<Text>,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
        position -> Int4,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        external_id -> Nullable<Varchar>,
        title -> Varchar,
        description -> Nullable<Text>,
        image_url -> Nullable<Varchar>,
        prep_time_min -> Nullable<Int4>,
        cuisine -> Nullable<Varchar>,
        source_url -> Nullable<Varchar>,
        steps -> Array<Text>,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        name -> Varchar,
        normalized_name -> Varchar,
        #[sql_name = "type"]
        tag_type -> Nullable<Varchar>,
    }
}

diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));

diesel::allow_tables_to_appear_in_same_query!(
    bookmarks,
    ingredients,
    recipe_ingredients,
    recipe_tags,
    recipes,
    tags,
);

pub mod catalog;
pub mod cells;
pub mod columns;
pub mod error;
pub mod etl;
pub mod measure;
pub mod normalize;
pub mod rank;
pub mod table;
pub mod types;

pub use catalog::{CatalogStore, CatalogWriter, MemoryCatalog};
pub use columns::{detect_columns, Column, ColumnMap, Field};
pub use error::{CatalogError, LoadError, TableError};
pub use etl::{load, load_path, LoadOptions, LoadReport};
pub use normalize::normalize;
pub use rank::rank;
pub use table::{Cell, Table};
pub use types::{
    BookmarkOwner, IngredientEntry, NewRecipe, RecipeDetail, RecipeId, RecipeMatch, RecipeSummary,
    TagEntry, TagMatch,
};

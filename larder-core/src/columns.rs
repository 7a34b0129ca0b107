//! Column sniffing: map loosely named spreadsheet headers to recipe fields.

use std::fmt;

use serde::Serialize;

/// Recipe fields a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Title,
    Description,
    Image,
    PrepTime,
    Cuisine,
    Source,
    Ingredients,
    Tags,
    Steps,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Id,
        Field::Title,
        Field::Description,
        Field::Image,
        Field::PrepTime,
        Field::Cuisine,
        Field::Source,
        Field::Ingredients,
        Field::Tags,
        Field::Steps,
    ];

    /// Header name fragments, most specific first.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id", "external_id", "recipe_id"],
            Field::Title => &["title", "name"],
            Field::Description => &["description", "desc", "summary"],
            Field::Image => &["image_url", "image", "photo"],
            Field::PrepTime => &[
                "prep_time_min",
                "prep",
                "time",
                "cook_time",
                "total_time",
                "ready in",
                "time to make",
                "duration",
                "minutes",
            ],
            Field::Cuisine => &["cuisine", "category"],
            Field::Source => &["source_url", "url", "link"],
            Field::Ingredients => &["ingredients", "ingredient_list", "ings"],
            Field::Tags => &["tags", "labels", "categories"],
            Field::Steps => &["steps", "instructions", "directions", "method", "procedure"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Description => "description",
            Field::Image => "image",
            Field::PrepTime => "prep_time",
            Field::Cuisine => "cuisine",
            Field::Source => "source",
            Field::Ingredients => "ingredients",
            Field::Tags => "tags",
            Field::Steps => "steps",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where a field comes from in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Column {
    Mapped { index: usize, name: String },
    Unmapped,
}

impl Column {
    pub fn index(&self) -> Option<usize> {
        match self {
            Column::Mapped { index, .. } => Some(*index),
            Column::Unmapped => None,
        }
    }
}

static UNMAPPED: Column = Column::Unmapped;

/// Resolved field -> column mapping for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(Field, Column)>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> &Column {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
            .unwrap_or(&UNMAPPED)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Column)> {
        self.columns.iter().map(|(f, c)| (*f, c))
    }
}

/// Match every field against the header row.
///
/// Exact case-insensitive matches win; failing that, the first column (in
/// table order) whose name contains any candidate fragment.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMap {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let columns = Field::ALL
        .iter()
        .map(|&field| {
            let candidates = field.candidates();

            let exact = candidates
                .iter()
                .find_map(|cand| lowered.iter().position(|name| name == cand));
            let found = exact.or_else(|| {
                lowered
                    .iter()
                    .position(|name| candidates.iter().any(|cand| name.contains(cand)))
            });

            let column = match found {
                Some(index) => Column::Mapped {
                    index,
                    name: headers[index].as_ref().to_string(),
                },
                None => Column::Unmapped,
            };
            (field, column)
        })
        .collect();

    ColumnMap { columns }
}

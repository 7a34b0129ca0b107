//! Overlap ranking of catalog recipes against a query ingredient set.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::catalog::CatalogStore;
use crate::error::CatalogError;
use crate::normalize::normalize;
use crate::types::{CandidateRecipe, RecipeId, RecipeMatch, TagMatch};

/// Normalize raw query strings into a key set, dropping anything that
/// normalizes to nothing.
pub fn normalize_query<S: AsRef<str>>(raw: &[S]) -> BTreeSet<String> {
    raw.iter()
        .map(|s| normalize(s.as_ref()))
        .filter(|key| !key.is_empty())
        .collect()
}

/// Rank recipes by how much of each recipe the query ingredients cover.
///
/// Recipes need at least one ingredient in common with the query and, when
/// tags are given, every one of the tags. Ordering is by match percentage,
/// then match count, then recipe id, so equal scores always come back in
/// the same order.
pub fn rank<S: AsRef<str>, T: AsRef<str>>(
    catalog: &dyn CatalogStore,
    ingredients: &[S],
    tags: &[T],
    limit: usize,
) -> Result<Vec<RecipeMatch>, CatalogError> {
    let query = normalize_query(ingredients);
    if query.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }
    let tag_query = normalize_query(tags);

    let mut candidates = catalog.find_by_normalized_ingredients(&query)?;

    if !tag_query.is_empty() {
        let tagged: HashSet<RecipeId> = catalog
            .find_by_normalized_tags(&tag_query, TagMatch::All)?
            .into_iter()
            .collect();
        candidates.retain(|c| tagged.contains(&c.recipe_id));
    }

    let scored = score_candidates(&query, candidates, limit);

    tracing::debug!(
        ingredients = ?query,
        tags = ?tag_query,
        matches = scored.len(),
        backend = catalog.backend_name(),
        "ranked recipes"
    );

    if scored.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<RecipeId> = scored.iter().map(|s| s.recipe_id).collect();
    let summaries: HashMap<RecipeId, _> = catalog
        .recipe_summaries(&ids)?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(scored
        .into_iter()
        .filter_map(|score| {
            let summary = summaries.get(&score.recipe_id)?;
            Some(RecipeMatch {
                recipe_id: score.recipe_id,
                title: summary.title.clone(),
                image_url: summary.image_url.clone(),
                prep_time_min: summary.prep_time_min,
                cuisine: summary.cuisine.clone(),
                match_count: score.match_count,
                match_pct: score.match_pct(),
            })
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Score {
    recipe_id: RecipeId,
    match_count: usize,
    total_count: usize,
}

impl Score {
    fn match_pct(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.match_count as f64 / self.total_count as f64
        }
    }

    /// Best first. Percentages are compared as exact fractions.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        let lhs = self.match_count as u128 * other.total_count.max(1) as u128;
        let rhs = other.match_count as u128 * self.total_count.max(1) as u128;
        rhs.cmp(&lhs)
            .then_with(|| other.match_count.cmp(&self.match_count))
            .then_with(|| self.recipe_id.cmp(&other.recipe_id))
    }
}

fn score_candidates(
    query: &BTreeSet<String>,
    candidates: Vec<CandidateRecipe>,
    limit: usize,
) -> Vec<Score> {
    let mut seen = HashSet::new();
    let mut scores: Vec<Score> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.recipe_id))
        .map(|c| {
            let match_count = c.normalized_ingredients.intersection(query).count();
            Score {
                recipe_id: c.recipe_id,
                match_count,
                total_count: c.total_count.max(match_count),
            }
        })
        .filter(|s| s.match_count > 0)
        .collect();

    scores.sort_by(Score::rank_cmp);
    scores.truncate(limit);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::types::{LinkFields, LinkTarget, NewRecipe};

    fn candidate(id: RecipeId, ingredients: &[&str]) -> CandidateRecipe {
        let set: BTreeSet<String> = ingredients.iter().map(|s| s.to_string()).collect();
        CandidateRecipe {
            recipe_id: id,
            total_count: set.len(),
            normalized_ingredients: set,
        }
    }

    fn query(items: &[&str]) -> BTreeSet<String> {
        normalize_query(items)
    }

    fn catalog_with(recipes: &[(&str, &[&str], &[&str])]) -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        catalog
            .write(&mut |w| {
                for (title, ingredients, tags) in recipes {
                    let id = w.insert_recipe(&NewRecipe {
                        title: title.to_string(),
                        ..Default::default()
                    })?;
                    for raw in ingredients.iter() {
                        let key = normalize(raw);
                        let ing = w.upsert_ingredient(raw, &key)?;
                        w.link(id, LinkTarget::Ingredient(ing), &LinkFields::default())?;
                    }
                    for raw in tags.iter() {
                        let key = normalize(raw);
                        let tag = w.upsert_tag(raw, &key, None)?;
                        w.link(id, LinkTarget::Tag(tag), &LinkFields::default())?;
                    }
                }
                Ok(())
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_pct_then_count_then_id() {
        let scores = score_candidates(
            &query(&["egg", "milk", "flour", "sugar"]),
            vec![
                candidate(1, &["egg", "milk", "flour", "butter"]), // 3/4
                candidate(2, &["egg", "milk"]),                    // 2/2
                candidate(3, &["egg"]),                            // 1/1
                candidate(4, &["egg", "flour", "yeast"]),          // 2/3
                candidate(5, &["milk", "sugar", "cocoa", "salt", "vanilla", "cream"]), // 2/6
                candidate(6, &["egg", "milk", "flour", "sugar"]),  // 4/4
            ],
            10,
        );
        let order: Vec<RecipeId> = scores.iter().map(|s| s.recipe_id).collect();
        assert_eq!(order, vec![6, 2, 3, 1, 4, 5]);
    }

    #[test]
    fn test_equal_scores_break_on_id() {
        let scores = score_candidates(
            &query(&["egg"]),
            vec![candidate(9, &["egg", "ham"]), candidate(3, &["egg", "rice"])],
            10,
        );
        let order: Vec<RecipeId> = scores.iter().map(|s| s.recipe_id).collect();
        assert_eq!(order, vec![3, 9]);
    }

    #[test]
    fn test_duplicates_collapsed_and_limit_applied() {
        let scores = score_candidates(
            &query(&["egg"]),
            vec![
                candidate(1, &["egg"]),
                candidate(1, &["egg"]),
                candidate(2, &["egg", "ham"]),
                candidate(3, &["ham"]),
            ],
            1,
        );
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].recipe_id, 1);
    }

    #[test]
    fn test_rank_empty_query_returns_nothing() {
        let catalog = catalog_with(&[("Omelette", &["eggs"], &[])]);
        let none: &[&str] = &[];
        assert!(rank(&catalog, none, none, 5).unwrap().is_empty());
        assert!(rank(&catalog, &["fresh", "  ", "cups"], &["vegan"], 5)
            .unwrap()
            .is_empty());
        assert!(rank(&catalog, &["eggs"], none, 0).unwrap().is_empty());
    }

    #[test]
    fn test_rank_tags_require_all() {
        let catalog = catalog_with(&[
            ("Tofu bowl", &["tofu", "rice"], &["Vegan", "Quick"]),
            ("Rice pudding", &["rice", "milk"], &["Quick"]),
            ("Fried rice", &["rice", "egg"], &[]),
        ]);

        let quick = rank(&catalog, &["Rice"], &["quick"], 10).unwrap();
        let titles: Vec<&str> = quick.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Tofu bowl", "Rice pudding"]);

        let both = rank(&catalog, &["rice"], &["QUICK", "vegan!"], 10).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Tofu bowl");

        let untagged = rank(&catalog, &["rice"], &["dessert"], 10).unwrap();
        assert!(untagged.is_empty());
    }

    #[test]
    fn test_rank_scores_are_bounded_and_stable() {
        let catalog = catalog_with(&[
            ("A", &["egg", "milk", "flour"], &[]),
            ("B", &["egg", "milk"], &[]),
            ("C", &["milk", "cocoa"], &[]),
            ("D", &["egg", "milk"], &[]),
        ]);
        let first = rank(&catalog, &["egg", "milk", "eggs"], &[] as &[&str], 10).unwrap();
        let second = rank(&catalog, &["milk", "egg"], &[] as &[&str], 10).unwrap();
        assert_eq!(first, second);

        let titles: Vec<&str> = first.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "D", "A", "C"]);
        for m in &first {
            assert!(m.match_pct >= 0.0 && m.match_pct <= 1.0);
        }
        assert_eq!(first[2].match_count, 2);
        assert!((first[2].match_pct - 2.0 / 3.0).abs() < 1e-9);
    }
}

//! Taxonomy find-or-create.
//!
//! Turns lists of free-form display names into lists of taxonomy row ids.
//! An exact name match wins; otherwise a new row is created with a slug
//! uniquified by numeric suffix. Blank names are skipped, and an empty
//! result falls back to the family's configured default.

use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::TaxonomyFamily;

/// What to return when every submitted name was blank or absent.
#[derive(Debug, Clone, Default)]
pub struct FallbackPolicy {
    pub default_id: Option<i64>,
}

impl FallbackPolicy {
    /// Fall back to a fixed row id.
    pub fn default_id(id: i64) -> Self {
        Self { default_id: Some(id) }
    }

    /// No fallback: empty in, empty out.
    pub fn none() -> Self {
        Self { default_id: None }
    }
}

/// Build a URL slug from a display name.
///
/// Lowercase, spaces to dashes, `&` to `-and-`, other non-alphanumerics
/// dropped, consecutive dashes collapsed.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase().replace('&', " and ");

    let mut slug = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if ch == ' ' || ch == '-' || ch == '_' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }

    slug.trim_matches('-').to_string()
}

/// Resolve display names to taxonomy ids, creating rows as needed.
pub async fn find_or_create(
    repo: &Arc<Repository>,
    family: TaxonomyFamily,
    names: &[String],
    fallback: &FallbackPolicy,
) -> Result<Vec<i64>, AppError> {
    let mut ids = Vec::new();

    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }

        if let Some(existing) = repo.find_taxonomy_by_name(family, name).await? {
            if !ids.contains(&existing.id) {
                ids.push(existing.id);
            }
            continue;
        }

        let slug = unique_slug(repo, family, name).await?;
        let id = repo.insert_taxonomy(family, name, &slug).await?;
        tracing::debug!(family = family.table(), name, slug, id, "taxonomy row created");
        ids.push(id);
    }

    if ids.is_empty() {
        if let Some(default_id) = fallback.default_id {
            ids.push(default_id);
        }
    }

    Ok(ids)
}

/// Slugify a name and uniquify with `-1`, `-2`, ... suffixes.
async fn unique_slug(
    repo: &Arc<Repository>,
    family: TaxonomyFamily,
    name: &str,
) -> Result<String, AppError> {
    let base = slugify(name);
    let base = if base.is_empty() { "item".to_string() } else { base };

    if !repo.taxonomy_slug_exists(family, &base).await? {
        return Ok(base);
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !repo.taxonomy_slug_exists(family, &candidate).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Beach Holidays"), "beach-holidays");
        assert_eq!(slugify("  Goa  "), "goa");
    }

    #[test]
    fn test_slugify_ampersand() {
        assert_eq!(slugify("Food & Wine"), "food-and-wine");
    }

    #[test]
    fn test_slugify_strips_and_collapses() {
        assert_eq!(slugify("What's    up?"), "whats-up");
        assert_eq!(slugify("--already--dashed--"), "already-dashed");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }
}

//! Relationship resolver: facet siblings and related-package discovery.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::{BlobStore, Repository};
use crate::errors::AppError;
use crate::models::{
    BlobKind, DestinationRefs, DestinationRow, FacetKey, PackageCard, PackageRow, SiblingView,
    TaxonomyFamily, ThemePageRow,
};
use crate::taxonomy::slugify;

/// Sibling navigation for one facet: other departure cities and other trip
/// categories of the same place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Siblings {
    pub from_siblings: Vec<SiblingView>,
    pub category_siblings: Vec<SiblingView>,
}

/// Ordering for discovered related packages: ascending trip length.
///
/// Used at every call site that appends discovered packages after a curated
/// list, so all "related packages" surfaces sort the same way.
pub fn related_package_order(a: &PackageCard, b: &PackageCard) -> Ordering {
    a.days.cmp(&b.days).then(a.id.cmp(&b.id))
}

/// Cross-entity matching over facets and destination-id sets.
#[derive(Clone)]
pub struct Resolver {
    repo: Arc<Repository>,
    blobs: BlobStore,
}

impl Resolver {
    pub fn new(repo: Arc<Repository>, blobs: BlobStore) -> Self {
        Self { repo, blobs }
    }

    /// Classify published same-name candidates into from/category siblings.
    ///
    /// Two rows are from-siblings when categories match and their `from`
    /// values differ; category-siblings under the symmetric condition with
    /// `from` held equal. Self-exclusion is by row id: a duplicate facet that
    /// slipped past uniqueness still shows up as a sibling.
    pub fn classify_siblings(
        own_id: i64,
        own: &FacetKey,
        candidates: &[(i64, FacetKey, String)],
    ) -> Siblings {
        let own = own.normalized();
        let mut siblings = Siblings::default();

        for (id, facet, slug) in candidates {
            if *id == own_id {
                continue;
            }
            let facet = facet.normalized();
            if facet.name != own.name {
                continue;
            }

            let view = SiblingView {
                id: *id,
                name: facet.name.clone(),
                from: facet.from.clone(),
                category: facet.category.clone(),
                slug: slug.clone(),
            };

            if facet.category == own.category && facet.from != own.from {
                siblings.from_siblings.push(view);
            } else if facet.from == own.from && facet.category != own.category {
                siblings.category_siblings.push(view);
            }
        }

        siblings
    }

    /// Siblings of a destination page.
    pub async fn destination_siblings(
        &self,
        row: &DestinationRow,
    ) -> Result<Siblings, AppError> {
        let candidates: Vec<(i64, FacetKey, String)> = self
            .repo
            .list_destinations_by_name(&row.name)
            .await?
            .into_iter()
            .map(|d| (d.id, d.facet(), d.slug))
            .collect();

        Ok(Self::classify_siblings(row.id, &row.facet(), &candidates))
    }

    /// Siblings of a theme page.
    pub async fn theme_page_siblings(&self, row: &ThemePageRow) -> Result<Siblings, AppError> {
        let candidates: Vec<(i64, FacetKey, String)> = self
            .repo
            .list_theme_pages_by_name(&row.name)
            .await?
            .into_iter()
            .map(|p| (p.id, p.facet(), p.slug))
            .collect();

        Ok(Self::classify_siblings(row.id, &row.facet(), &candidates))
    }

    /// Published packages whose destination-id set intersects the set of
    /// destination ids sharing `destination_name`, optionally narrowed to
    /// packages tagged with a theme matching `category`.
    pub async fn related_packages(
        &self,
        destination_name: &str,
        category: Option<&str>,
    ) -> Result<Vec<PackageRow>, AppError> {
        let destination_ids: HashSet<i64> = self
            .repo
            .list_destinations_by_name(destination_name)
            .await?
            .iter()
            .map(|d| d.id)
            .collect();

        if destination_ids.is_empty() {
            return Ok(Vec::new());
        }

        let theme_filter = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(cat) => Some(self.resolve_theme_name(cat).await?),
            None => None,
        };

        let mut matches = Vec::new();
        for package in self.repo.list_published_packages().await? {
            let refs: DestinationRefs = self
                .blobs
                .read_or_default(package.destinations_blob, BlobKind::Destinations)
                .await?;
            if !refs.0.iter().any(|id| destination_ids.contains(id)) {
                continue;
            }

            if let Some(theme) = &theme_filter {
                let themes: Vec<String> = self
                    .blobs
                    .read_or_default(package.themes_blob, BlobKind::Themes)
                    .await?;
                if !themes
                    .iter()
                    .any(|t| t.trim().eq_ignore_ascii_case(theme))
                {
                    continue;
                }
            }

            matches.push(package);
        }

        Ok(matches)
    }

    /// Count of published related packages, used for destination cards.
    pub async fn related_package_count(
        &self,
        destination_name: &str,
        category: Option<&str>,
    ) -> Result<i64, AppError> {
        Ok(self.related_packages(destination_name, category).await?.len() as i64)
    }

    /// Map a category filter to a theme display name, accepting either the
    /// name itself or its slug.
    async fn resolve_theme_name(&self, category: &str) -> Result<String, AppError> {
        if let Some(entry) = self
            .repo
            .find_taxonomy_by_name(TaxonomyFamily::Themes, category)
            .await?
        {
            return Ok(entry.name);
        }
        if let Some(entry) = self
            .repo
            .find_taxonomy_by_slug(TaxonomyFamily::Themes, &slugify(category))
            .await?
        {
            return Ok(entry.name);
        }
        Ok(category.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, name: &str, from: &str, category: &str) -> (i64, FacetKey, String) {
        (id, FacetKey::new(name, from, category), format!("slug-{id}"))
    }

    #[test]
    fn test_from_siblings_mutual() {
        // Goa/Beach base page and the Goa-from-Delhi variant list each other
        let a = FacetKey::new("Goa", "", "Beach");
        let b = FacetKey::new("Goa", "Delhi", "Beach");

        let from_a = Resolver::classify_siblings(1, &a, &[candidate(2, "Goa", "Delhi", "Beach")]);
        assert_eq!(from_a.from_siblings.len(), 1);
        assert_eq!(from_a.from_siblings[0].id, 2);
        assert!(from_a.category_siblings.is_empty());

        let from_b = Resolver::classify_siblings(2, &b, &[candidate(1, "Goa", "", "Beach")]);
        assert_eq!(from_b.from_siblings.len(), 1);
        assert_eq!(from_b.from_siblings[0].id, 1);
    }

    #[test]
    fn test_duplicate_facet_is_not_self() {
        // A duplicate row sharing all three facet values is excluded by id
        // comparison only when it IS the same row
        let a = FacetKey::new("Goa", "", "Beach");
        let dup = candidate(3, "Goa", "", "Beach");

        let result = Resolver::classify_siblings(1, &a, &[dup, candidate(1, "Goa", "", "Beach")]);
        // identical facet differs in neither dimension, so it is no sibling
        assert!(result.from_siblings.is_empty());
        assert!(result.category_siblings.is_empty());
    }

    #[test]
    fn test_category_siblings() {
        let a = FacetKey::new("Goa", "Delhi", "Beach");
        let result = Resolver::classify_siblings(
            1,
            &a,
            &[
                candidate(2, "Goa", "Delhi", "Honeymoon"),
                candidate(3, "Goa", "Mumbai", "Honeymoon"),
                candidate(4, "Kerala", "Delhi", "Honeymoon"),
            ],
        );
        assert_eq!(result.category_siblings.len(), 1);
        assert_eq!(result.category_siblings[0].id, 2);
        // id 3 differs in both dimensions, id 4 differs in name
        assert!(result.from_siblings.is_empty());
    }

    #[test]
    fn test_facet_trim_before_compare() {
        let a = FacetKey::new("Goa", "", "Beach");
        let result =
            Resolver::classify_siblings(1, &a, &[candidate(2, " Goa ", " Delhi ", " Beach ")]);
        assert_eq!(result.from_siblings.len(), 1);
    }

    #[test]
    fn test_related_package_order_ascending_days() {
        let card = |id: i64, days: i64| PackageCard {
            id,
            title: String::new(),
            slug: String::new(),
            rating: None,
            days,
            nights: days - 1,
            price: None,
            images: Vec::new(),
        };

        let mut cards = vec![card(1, 7), card(2, 3), card(3, 5)];
        cards.sort_by(related_package_order);
        let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}

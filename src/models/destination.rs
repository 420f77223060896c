//! Destination page models and the facet key.

use serde::{Deserialize, Serialize};

/// The identity facet of a destination or theme page.
///
/// Two rows are the same logical page when all three parts match after
/// trimming. `from` empty means the page is not origin-specific; `category`
/// empty means it is not theme-specific. Uniqueness is enforced both by a
/// pre-check (friendly error) and a composite unique index (race backstop).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetKey {
    pub name: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub category: String,
}

impl FacetKey {
    pub fn new(name: &str, from: &str, category: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            from: from.trim().to_string(),
            category: category.trim().to_string(),
        }
    }

    pub fn normalized(&self) -> Self {
        Self::new(&self.name, &self.from, &self.category)
    }
}

/// A row from the `destinations` table.
#[derive(Debug, Clone)]
pub struct DestinationRow {
    pub id: i64,
    pub name: String,
    pub from_location: String,
    pub category: String,
    pub country: Option<String>,
    pub title: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub images: Vec<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub meta_blob: Option<i64>,
    pub popular_packages_blob: Option<i64>,
    pub main_packages_blob: Option<i64>,
    pub faqs_blob: Option<i64>,
}

impl DestinationRow {
    pub fn facet(&self) -> FacetKey {
        FacetKey::new(&self.name, &self.from_location, &self.category)
    }

    pub fn blob_handles(&self) -> Vec<i64> {
        [
            self.meta_blob,
            self.popular_packages_blob,
            self.main_packages_blob,
            self.faqs_blob,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Sparse create/update payload for a destination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDestinationRequest {
    pub name: Option<String>,
    pub from: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub status: Option<String>,
    pub meta_title: Option<String>,
    pub meta_tags: Option<String>,
    pub extra_meta_tags: Option<String>,
    #[serde(default, deserialize_with = "super::blob::flexible_id_list_opt")]
    pub popular_packages: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "super::blob::flexible_id_list_opt")]
    pub main_packages: Option<Vec<i64>>,
    pub faqs: Option<Vec<super::blob::FaqItem>>,
    pub images: Option<Vec<String>>,
    pub retained_images: Option<Vec<String>>,
}

/// Fully hydrated admin view of a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationView {
    pub id: i64,
    pub name: String,
    pub from: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub status: String,
    pub meta_title: String,
    pub meta_tags: String,
    pub extra_meta_tags: String,
    pub popular_packages: Vec<i64>,
    pub main_packages: Vec<i64>,
    pub faqs: Vec<super::blob::FaqItem>,
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Public view of a destination with curated + discovered packages merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDestinationView {
    pub id: i64,
    pub name: String,
    pub from: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub meta_title: String,
    pub meta_tags: String,
    pub extra_meta_tags: String,
    pub popular_packages: Vec<super::package::PackageCard>,
    /// Curated main packages first, then discovered related packages
    pub packages: Vec<super::package::PackageCard>,
    pub faqs: Vec<super::blob::FaqItem>,
    pub images: Vec<String>,
}

/// A facet sibling of a destination or theme page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingView {
    pub id: i64,
    pub name: String,
    pub from: String,
    pub category: String,
    pub slug: String,
}

/// Request body for the related-package lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPackagesRequest {
    pub destination_name: String,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_key_equality_after_trim() {
        let a = FacetKey::new(" Goa ", "Delhi", "");
        let b = FacetKey::new("Goa", " Delhi ", "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_facet_key_parts_distinguish() {
        let base = FacetKey::new("Goa", "", "");
        assert_ne!(base, FacetKey::new("Goa", "Delhi", ""));
        assert_ne!(base, FacetKey::new("Goa", "", "Beach"));
    }
}

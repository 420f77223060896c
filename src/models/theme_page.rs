//! Theme page models.
//!
//! Theme pages share the destination facet mechanics but curate destinations
//! instead of popular packages.

use serde::{Deserialize, Serialize};

use super::blob::FaqItem;
use super::destination::FacetKey;
use super::package::PackageCard;

/// A row from the `theme_pages` table.
#[derive(Debug, Clone)]
pub struct ThemePageRow {
    pub id: i64,
    pub name: String,
    pub from_location: String,
    pub category: String,
    pub title: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub images: Vec<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub meta_blob: Option<i64>,
    pub popular_destinations_blob: Option<i64>,
    pub main_packages_blob: Option<i64>,
    pub faqs_blob: Option<i64>,
}

impl ThemePageRow {
    pub fn facet(&self) -> FacetKey {
        FacetKey::new(&self.name, &self.from_location, &self.category)
    }

    pub fn blob_handles(&self) -> Vec<i64> {
        [
            self.meta_blob,
            self.popular_destinations_blob,
            self.main_packages_blob,
            self.faqs_blob,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Sparse create/update payload for a theme page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveThemePageRequest {
    pub name: Option<String>,
    pub from: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub status: Option<String>,
    pub meta_title: Option<String>,
    pub meta_tags: Option<String>,
    pub extra_meta_tags: Option<String>,
    /// Destination names curated onto this page
    pub popular_destinations: Option<Vec<String>>,
    #[serde(default, deserialize_with = "super::blob::flexible_id_list_opt")]
    pub main_packages: Option<Vec<i64>>,
    pub faqs: Option<Vec<FaqItem>>,
    pub images: Option<Vec<String>>,
    pub retained_images: Option<Vec<String>>,
}

/// Fully hydrated admin view of a theme page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePageView {
    pub id: i64,
    pub name: String,
    pub from: String,
    pub category: String,
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
    pub popular_destinations: Vec<String>,
    pub main_packages: Vec<i64>,
    pub faqs: Vec<FaqItem>,
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A curated destination enriched into a display card.
///
/// `count` is the number of published packages related to that destination
/// name within this page's category. The slug prefers the destination
/// variant matching this page's `from`, falling back to the category variant
/// with no `from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationCard {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub images: Vec<String>,
    pub count: i64,
}

/// Public view of a theme page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicThemePageView {
    pub id: i64,
    pub name: String,
    pub from: String,
    pub category: String,
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
    pub popular_destinations: Vec<DestinationCard>,
    /// Curated main packages first, then discovered related packages
    pub packages: Vec<PackageCard>,
    pub faqs: Vec<FaqItem>,
    pub images: Vec<String>,
}

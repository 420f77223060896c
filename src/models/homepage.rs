//! Homepage curation models.
//!
//! The homepage is a singleton blob of kind `homepage`; there is no root
//! table. Stored content is references only; the public view enriches each
//! section and silently drops dangling references.

use serde::{Deserialize, Serialize};

use super::blob::flexible_id_list;
use super::package::PackageCard;
use super::theme_page::DestinationCard;

/// A homepage banner slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub link: String,
}

/// A theme section curated onto the homepage: a theme name plus packages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSection {
    pub theme: String,
    #[serde(default, deserialize_with = "flexible_id_list")]
    pub package_ids: Vec<i64>,
}

/// The stored homepage content (references only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageContent {
    #[serde(default)]
    pub banners: Vec<Banner>,
    /// Destination names
    #[serde(default)]
    pub popular_destinations: Vec<String>,
    #[serde(default, deserialize_with = "flexible_id_list")]
    pub popular_packages: Vec<i64>,
    #[serde(default)]
    pub theme_sections: Vec<ThemeSection>,
    /// Season names
    #[serde(default)]
    pub seasons: Vec<String>,
    /// Destination names for the domestic cards row
    #[serde(default)]
    pub domestic: Vec<String>,
    /// Destination names for the international cards row
    #[serde(default)]
    pub international: Vec<String>,
    /// Review uuids
    #[serde(default)]
    pub review_ids: Vec<String>,
    #[serde(default, deserialize_with = "flexible_id_list")]
    pub blog_ids: Vec<i64>,
}

/// An enriched theme section in the public view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSectionView {
    pub theme: String,
    pub packages: Vec<PackageCard>,
}

/// A blog card on the homepage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCard {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: String,
}

/// The enriched public homepage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageView {
    pub banners: Vec<Banner>,
    pub popular_destinations: Vec<DestinationCard>,
    pub popular_packages: Vec<PackageCard>,
    pub theme_sections: Vec<ThemeSectionView>,
    pub seasons: Vec<super::taxonomy::TaxonomyEntry>,
    pub domestic: Vec<DestinationCard>,
    pub international: Vec<DestinationCard>,
    pub reviews: Vec<super::review::ReviewView>,
    pub blogs: Vec<BlogCard>,
}

//! Taxonomy models: flat name registries behind find-or-create.

use serde::{Deserialize, Serialize};

/// The taxonomy families, each backed by its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyFamily {
    Themes,
    Seasons,
    Countries,
    Includes,
    BlogCategories,
    BlogTags,
}

impl TaxonomyFamily {
    /// Table names are a closed set; this never interpolates user input.
    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyFamily::Themes => "themes",
            TaxonomyFamily::Seasons => "seasons",
            TaxonomyFamily::Countries => "countries",
            TaxonomyFamily::Includes => "includes",
            TaxonomyFamily::BlogCategories => "blog_categories",
            TaxonomyFamily::BlogTags => "blog_tags",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "themes" => Some(TaxonomyFamily::Themes),
            "seasons" => Some(TaxonomyFamily::Seasons),
            "countries" => Some(TaxonomyFamily::Countries),
            "includes" => Some(TaxonomyFamily::Includes),
            "blog-categories" | "blog_categories" => Some(TaxonomyFamily::BlogCategories),
            "blog-tags" | "blog_tags" => Some(TaxonomyFamily::BlogTags),
            _ => None,
        }
    }
}

/// One taxonomy row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

//! Tour package models.
//!
//! A package row carries the queryable scalars plus one blob handle per
//! structured field. Requests are sparse: absent fields leave the stored
//! value untouched on update.

use serde::{Deserialize, Serialize};

use super::blob::{
    flexible_id_list_opt, FaqItem, ItineraryDay, JourneyStop, PriceTier, PricingView,
};

/// A row from the `packages` table with its blob handles.
#[derive(Debug, Clone)]
pub struct PackageRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub rating: Option<f64>,
    pub max_group: Option<i64>,
    pub customizable: bool,
    pub marking: Option<String>,
    pub overview: Option<String>,
    pub additional_info: Option<String>,
    pub status: String,
    /// Image handle ids, embedded JSON
    pub images: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
    // Blob handles, one per structured field
    pub time_blob: Option<i64>,
    pub destinations_blob: Option<i64>,
    pub seasons_blob: Option<i64>,
    pub themes_blob: Option<i64>,
    pub includes_blob: Option<i64>,
    pub meta_blob: Option<i64>,
    pub journey_blob: Option<i64>,
    pub itinerary_blob: Option<i64>,
    pub inclusions_blob: Option<i64>,
    pub exclusions_blob: Option<i64>,
    pub price_blob: Option<i64>,
    pub faq_blob: Option<i64>,
}

impl PackageRow {
    /// All blob handles owned by this row, for cascade delete.
    pub fn blob_handles(&self) -> Vec<i64> {
        [
            self.time_blob,
            self.destinations_blob,
            self.seasons_blob,
            self.themes_blob,
            self.includes_blob,
            self.meta_blob,
            self.journey_blob,
            self.itinerary_blob,
            self.inclusions_blob,
            self.exclusions_blob,
            self.price_blob,
            self.faq_blob,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Sparse create/update payload for a package.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePackageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub rating: Option<f64>,
    pub max_group: Option<i64>,
    pub customizable: Option<bool>,
    pub marking: Option<String>,
    pub overview: Option<String>,
    pub additional_info: Option<String>,
    pub status: Option<String>,
    pub days: Option<i64>,
    pub nights: Option<i64>,
    #[serde(default, deserialize_with = "flexible_id_list_opt")]
    pub destinations: Option<Vec<i64>>,
    pub seasons: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    pub includes: Option<Vec<String>>,
    pub meta_title: Option<String>,
    pub meta_tags: Option<String>,
    pub extra_meta_tags: Option<String>,
    pub journey: Option<Vec<JourneyStop>>,
    pub itinerary: Option<Vec<ItineraryDay>>,
    pub inclusions: Option<Vec<String>>,
    pub exclusions: Option<Vec<String>>,
    pub pricing: Option<Vec<PriceTier>>,
    pub faqs: Option<Vec<FaqItem>>,
    /// Newly uploaded image file names to register and append
    pub images: Option<Vec<String>>,
    /// Stored image paths to keep; stored images not listed here are dropped
    pub retained_images: Option<Vec<String>>,
}

/// Fully hydrated admin view of a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_group: Option<i64>,
    pub customizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    pub status: String,
    pub days: i64,
    pub nights: i64,
    pub destinations: Vec<i64>,
    pub seasons: Vec<String>,
    pub themes: Vec<String>,
    pub includes: Vec<String>,
    pub meta_title: String,
    pub meta_tags: String,
    pub extra_meta_tags: String,
    pub journey: Vec<JourneyStop>,
    pub itinerary: Vec<ItineraryDay>,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub pricing: PricingView,
    pub faqs: Vec<FaqItem>,
    /// Resolved image file paths
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// An include resolved to its taxonomy row and icon path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeView {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Public view of a package. Same shape as the admin view except includes
/// resolve to full taxonomy entries with icons, and destination ids resolve
/// to names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPackageView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_group: Option<i64>,
    pub customizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    pub days: i64,
    pub nights: i64,
    pub destinations: Vec<String>,
    pub seasons: Vec<String>,
    pub themes: Vec<String>,
    pub includes: Vec<IncludeView>,
    pub meta_title: String,
    pub meta_tags: String,
    pub extra_meta_tags: String,
    pub journey: Vec<JourneyStop>,
    pub itinerary: Vec<ItineraryDay>,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub pricing: PricingView,
    pub faqs: Vec<FaqItem>,
    pub images: Vec<String>,
}

/// Compact package card used in related-package lists and curation sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCard {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub days: i64,
    pub nights: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub images: Vec<String>,
}

/// Slug availability check payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSlugRequest {
    pub slug: String,
    pub exclude_id: Option<i64>,
}

/// Slug availability check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSlugResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

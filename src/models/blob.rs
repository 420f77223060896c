//! Blob store records and the typed payloads stored in them.
//!
//! Every piece of structured, non-queryable content lives in the shared
//! `blobs` table as JSON text, tagged with a `BlobKind`. The kind is a closed
//! enum so a handle is always read back with the payload type it was written
//! with; a mismatch degrades at the read site instead of crashing.

use serde::{Deserialize, Deserializer, Serialize};

/// The closed set of payload kinds the blob store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    Meta,
    Time,
    Destinations,
    Seasons,
    Themes,
    Includes,
    Journey,
    Itinerary,
    Inclusions,
    Exclusions,
    Pricing,
    Faqs,
    PopularPackages,
    MainPackages,
    PopularDestinations,
    Homepage,
}

impl BlobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobKind::Meta => "meta",
            BlobKind::Time => "time",
            BlobKind::Destinations => "destinations",
            BlobKind::Seasons => "seasons",
            BlobKind::Themes => "themes",
            BlobKind::Includes => "includes",
            BlobKind::Journey => "journey",
            BlobKind::Itinerary => "itinerary",
            BlobKind::Inclusions => "inclusions",
            BlobKind::Exclusions => "exclusions",
            BlobKind::Pricing => "pricing",
            BlobKind::Faqs => "faqs",
            BlobKind::PopularPackages => "popular_packages",
            BlobKind::MainPackages => "main_packages",
            BlobKind::PopularDestinations => "popular_destinations",
            BlobKind::Homepage => "homepage",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "meta" => Some(BlobKind::Meta),
            "time" => Some(BlobKind::Time),
            "destinations" => Some(BlobKind::Destinations),
            "seasons" => Some(BlobKind::Seasons),
            "themes" => Some(BlobKind::Themes),
            "includes" => Some(BlobKind::Includes),
            "journey" => Some(BlobKind::Journey),
            "itinerary" => Some(BlobKind::Itinerary),
            "inclusions" => Some(BlobKind::Inclusions),
            "exclusions" => Some(BlobKind::Exclusions),
            "pricing" => Some(BlobKind::Pricing),
            "faqs" => Some(BlobKind::Faqs),
            "popular_packages" => Some(BlobKind::PopularPackages),
            "main_packages" => Some(BlobKind::MainPackages),
            "popular_destinations" => Some(BlobKind::PopularDestinations),
            "homepage" => Some(BlobKind::Homepage),
            _ => None,
        }
    }
}

/// A raw row from the `blobs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub id: i64,
    pub kind: String,
    pub data: String,
    pub updated_at: String,
}

// ==================== PAYLOADS ====================

/// Trip duration, stored once and flattened into days/nights on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInfo {
    pub days: i64,
    pub nights: i64,
}

/// SEO metadata shared by packages, destinations, theme pages and blogs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub extra: String,
}

impl MetaInfo {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.tags.trim().is_empty()
    }
}

/// One stop on the journey route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStop {
    pub place: String,
    #[serde(default)]
    pub nights: i64,
}

/// One day of the itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// One pricing tier. The pricing blob holds up to three of these, mapped to
/// deluxe/luxury/premium positions on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
}

/// Named view over the positional pricing array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deluxe: Option<PriceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luxury: Option<PriceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<PriceTier>,
}

impl PricingView {
    pub fn from_tiers(tiers: &[PriceTier]) -> Self {
        Self {
            deluxe: tiers.first().cloned(),
            luxury: tiers.get(1).cloned(),
            premium: tiers.get(2).cloned(),
        }
    }
}

/// A question/answer pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

// ==================== TOLERANT ID LISTS ====================

/// Deserialize a list of row ids accepting both numbers and numeric strings.
///
/// Historical payloads mixed `[3, "7"]`; non-numeric entries are dropped.
pub fn flexible_id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.iter().filter_map(value_as_id).collect())
}

/// Same as [`flexible_id_list`] for optional fields.
pub fn flexible_id_list_opt<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw.map(|values| values.iter().filter_map(value_as_id).collect()))
}

fn value_as_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List of destination row ids referenced by a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationRefs(
    #[serde(deserialize_with = "flexible_id_list")] pub Vec<i64>,
);

/// List of curated package row ids (popular/main package sections).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRefs(
    #[serde(deserialize_with = "flexible_id_list")] pub Vec<i64>,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_kind_round_trip() {
        for kind in [
            BlobKind::Meta,
            BlobKind::Time,
            BlobKind::Destinations,
            BlobKind::Pricing,
            BlobKind::PopularDestinations,
            BlobKind::Homepage,
        ] {
            assert_eq!(BlobKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(BlobKind::from_str("bogus"), None);
    }

    #[test]
    fn test_flexible_id_list_mixed_shapes() {
        let refs: DestinationRefs = serde_json::from_str(r#"[3, "7", " 12 ", null, "x"]"#).unwrap();
        assert_eq!(refs.0, vec![3, 7, 12]);
    }

    #[test]
    fn test_pricing_view_positions() {
        let tiers = vec![
            PriceTier { price: 100.0, original_price: None },
            PriceTier { price: 200.0, original_price: Some(250.0) },
        ];
        let view = PricingView::from_tiers(&tiers);
        assert_eq!(view.deluxe.unwrap().price, 100.0);
        assert_eq!(view.luxury.unwrap().price, 200.0);
        assert!(view.premium.is_none());
    }
}

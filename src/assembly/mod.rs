//! Composite assembler: read-side hydration of entity rows into views.
//!
//! Every blob handle and foreign id resolves through a degrading path: a
//! missing or unreadable reference becomes an empty value plus a warning,
//! never a failed response. List-valued references resolve element-wise and
//! drop failures while preserving the order of successes. Assembly is
//! read-only; two assemblies of the same stored state give identical output.

use std::collections::HashSet;
use std::sync::Arc;

use crate::db::{BlobStore, Repository};
use crate::errors::AppError;
use crate::models::{
    status, BlobKind, BlogCard, BlogRow, BlogView, DestinationCard, DestinationRefs,
    DestinationRow, DestinationView, FaqItem, HomepageContent, HomepageView, IncludeView,
    ItineraryDay, JourneyStop, MetaInfo, PackageCard, PackageRefs, PackageRow, PackageView,
    PriceTier, PricingView, PublicDestinationView, PublicPackageView, PublicThemePageView,
    TaxonomyFamily, ThemePageRow, ThemePageView, ThemeSectionView, TimeInfo,
};
use crate::related::{related_package_order, Resolver};

/// Merge curated and discovered package cards: curated first in curator
/// order, discovered sorted by trip length, de-duplicated by id with curated
/// winning.
pub fn merge_package_cards(
    curated: Vec<PackageCard>,
    mut discovered: Vec<PackageCard>,
) -> Vec<PackageCard> {
    let mut seen: HashSet<i64> = curated.iter().map(|c| c.id).collect();
    discovered.sort_by(related_package_order);

    let mut merged = curated;
    for card in discovered {
        if seen.insert(card.id) {
            merged.push(card);
        }
    }
    merged
}

/// Read-side hydration over the blob store and repositories.
#[derive(Clone)]
pub struct Assembler {
    repo: Arc<Repository>,
    blobs: BlobStore,
    resolver: Resolver,
}

impl Assembler {
    pub fn new(repo: Arc<Repository>, blobs: BlobStore, resolver: Resolver) -> Self {
        Self { repo, blobs, resolver }
    }

    // ==================== PACKAGES ====================

    /// Full admin view of a package (drafts included).
    pub async fn package_admin(&self, row: &PackageRow) -> Result<PackageView, AppError> {
        let time: TimeInfo = self.blobs.read_or_default(row.time_blob, BlobKind::Time).await?;
        let destinations: DestinationRefs = self
            .blobs
            .read_or_default(row.destinations_blob, BlobKind::Destinations)
            .await?;
        let seasons: Vec<String> =
            self.blobs.read_or_default(row.seasons_blob, BlobKind::Seasons).await?;
        let themes: Vec<String> =
            self.blobs.read_or_default(row.themes_blob, BlobKind::Themes).await?;
        let includes: Vec<String> =
            self.blobs.read_or_default(row.includes_blob, BlobKind::Includes).await?;
        let meta: MetaInfo = self.blobs.read_or_default(row.meta_blob, BlobKind::Meta).await?;
        let journey: Vec<JourneyStop> =
            self.blobs.read_or_default(row.journey_blob, BlobKind::Journey).await?;
        let itinerary: Vec<ItineraryDay> =
            self.blobs.read_or_default(row.itinerary_blob, BlobKind::Itinerary).await?;
        let inclusions: Vec<String> =
            self.blobs.read_or_default(row.inclusions_blob, BlobKind::Inclusions).await?;
        let exclusions: Vec<String> =
            self.blobs.read_or_default(row.exclusions_blob, BlobKind::Exclusions).await?;
        let pricing: Vec<PriceTier> =
            self.blobs.read_or_default(row.price_blob, BlobKind::Pricing).await?;
        let faqs: Vec<FaqItem> =
            self.blobs.read_or_default(row.faq_blob, BlobKind::Faqs).await?;
        let images = self.repo.image_paths(&row.images).await?;

        Ok(PackageView {
            id: row.id,
            title: row.title.clone(),
            slug: row.slug.clone(),
            rating: row.rating,
            max_group: row.max_group,
            customizable: row.customizable,
            marking: row.marking.clone(),
            overview: row.overview.clone(),
            additional_info: row.additional_info.clone(),
            status: row.status.clone(),
            days: time.days,
            nights: time.nights,
            destinations: destinations.0,
            seasons,
            themes,
            includes,
            meta_title: meta.title,
            meta_tags: meta.tags,
            extra_meta_tags: meta.extra,
            journey,
            itinerary,
            inclusions,
            exclusions,
            pricing: PricingView::from_tiers(&pricing),
            faqs,
            images,
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        })
    }

    /// Public view of a package. Callers gate on published status first.
    pub async fn package_public(&self, row: &PackageRow) -> Result<PublicPackageView, AppError> {
        let admin = self.package_admin(row).await?;

        // Destination ids become display names; dangling ids are dropped
        let mut destination_names = Vec::with_capacity(admin.destinations.len());
        for id in &admin.destinations {
            match self.repo.get_destination(*id).await? {
                Some(dest) => destination_names.push(dest.name),
                None => tracing::warn!(package = row.id, destination = id, "destination reference dangling"),
            }
        }

        // Include names resolve to taxonomy entries with icon paths
        let mut includes = Vec::with_capacity(admin.includes.len());
        for name in &admin.includes {
            match self
                .repo
                .find_taxonomy_by_name(TaxonomyFamily::Includes, name)
                .await?
            {
                Some(entry) => includes.push(IncludeView {
                    id: entry.id,
                    name: entry.name,
                    file_path: entry.image,
                }),
                None => {
                    tracing::warn!(package = row.id, include = %name, "include not in taxonomy");
                    includes.push(IncludeView {
                        id: 0,
                        name: name.clone(),
                        file_path: None,
                    });
                }
            }
        }

        Ok(PublicPackageView {
            id: admin.id,
            title: admin.title,
            slug: admin.slug,
            rating: admin.rating,
            max_group: admin.max_group,
            customizable: admin.customizable,
            marking: admin.marking,
            overview: admin.overview,
            additional_info: admin.additional_info,
            days: admin.days,
            nights: admin.nights,
            destinations: destination_names,
            seasons: admin.seasons,
            themes: admin.themes,
            includes,
            meta_title: admin.meta_title,
            meta_tags: admin.meta_tags,
            extra_meta_tags: admin.extra_meta_tags,
            journey: admin.journey,
            itinerary: admin.itinerary,
            inclusions: admin.inclusions,
            exclusions: admin.exclusions,
            pricing: admin.pricing,
            faqs: admin.faqs,
            images: admin.images,
        })
    }

    /// Compact card for listings and curation sections.
    pub async fn package_card(&self, row: &PackageRow) -> Result<PackageCard, AppError> {
        let time: TimeInfo = self.blobs.read_or_default(row.time_blob, BlobKind::Time).await?;
        let pricing: Vec<PriceTier> =
            self.blobs.read_or_default(row.price_blob, BlobKind::Pricing).await?;
        let images = self.repo.image_paths(&row.images).await?;

        Ok(PackageCard {
            id: row.id,
            title: row.title.clone(),
            slug: row.slug.clone(),
            rating: row.rating,
            days: time.days,
            nights: time.nights,
            price: pricing.first().map(|t| t.price),
            images,
        })
    }

    /// Resolve a list of curated package ids to published cards, preserving
    /// curator order and dropping dangling or unpublished references.
    pub async fn curated_package_cards(&self, ids: &[i64]) -> Result<Vec<PackageCard>, AppError> {
        let mut cards = Vec::with_capacity(ids.len());
        for id in ids {
            match self.repo.get_package(*id).await? {
                Some(pkg) if pkg.status == status::PUBLISHED => {
                    cards.push(self.package_card(&pkg).await?);
                }
                Some(_) => {}
                None => tracing::warn!(package = id, "curated package reference dangling"),
            }
        }
        Ok(cards)
    }

    // ==================== DESTINATIONS ====================

    pub async fn destination_admin(
        &self,
        row: &DestinationRow,
    ) -> Result<DestinationView, AppError> {
        let meta: MetaInfo = self.blobs.read_or_default(row.meta_blob, BlobKind::Meta).await?;
        let popular: PackageRefs = self
            .blobs
            .read_or_default(row.popular_packages_blob, BlobKind::PopularPackages)
            .await?;
        let main: PackageRefs = self
            .blobs
            .read_or_default(row.main_packages_blob, BlobKind::MainPackages)
            .await?;
        let faqs: Vec<FaqItem> =
            self.blobs.read_or_default(row.faqs_blob, BlobKind::Faqs).await?;
        let images = self.repo.image_paths(&row.images).await?;

        Ok(DestinationView {
            id: row.id,
            name: row.name.clone(),
            from: row.from_location.clone(),
            category: row.category.clone(),
            country: row.country.clone(),
            title: row.title.clone(),
            slug: row.slug.clone(),
            description: row.description.clone(),
            long_description: row.long_description.clone(),
            status: row.status.clone(),
            meta_title: meta.title,
            meta_tags: meta.tags,
            extra_meta_tags: meta.extra,
            popular_packages: popular.0,
            main_packages: main.0,
            faqs,
            images,
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        })
    }

    /// Public destination view: curated main packages merged with discovered
    /// related packages.
    pub async fn destination_public(
        &self,
        row: &DestinationRow,
    ) -> Result<PublicDestinationView, AppError> {
        let admin = self.destination_admin(row).await?;

        let popular_packages = self.curated_package_cards(&admin.popular_packages).await?;
        let curated = self.curated_package_cards(&admin.main_packages).await?;

        let category = if row.category.trim().is_empty() {
            None
        } else {
            Some(row.category.as_str())
        };
        let related = self.resolver.related_packages(&row.name, category).await?;
        let mut discovered = Vec::with_capacity(related.len());
        for pkg in &related {
            discovered.push(self.package_card(pkg).await?);
        }

        Ok(PublicDestinationView {
            id: admin.id,
            name: admin.name,
            from: admin.from,
            category: admin.category,
            country: admin.country,
            title: admin.title,
            slug: admin.slug,
            description: admin.description,
            long_description: admin.long_description,
            meta_title: admin.meta_title,
            meta_tags: admin.meta_tags,
            extra_meta_tags: admin.extra_meta_tags,
            popular_packages,
            packages: merge_package_cards(curated, discovered),
            faqs: admin.faqs,
            images: admin.images,
        })
    }

    // ==================== THEME PAGES ====================

    pub async fn theme_page_admin(&self, row: &ThemePageRow) -> Result<ThemePageView, AppError> {
        let meta: MetaInfo = self.blobs.read_or_default(row.meta_blob, BlobKind::Meta).await?;
        let popular_destinations: Vec<String> = self
            .blobs
            .read_or_default(row.popular_destinations_blob, BlobKind::PopularDestinations)
            .await?;
        let main: PackageRefs = self
            .blobs
            .read_or_default(row.main_packages_blob, BlobKind::MainPackages)
            .await?;
        let faqs: Vec<FaqItem> =
            self.blobs.read_or_default(row.faqs_blob, BlobKind::Faqs).await?;
        let images = self.repo.image_paths(&row.images).await?;

        Ok(ThemePageView {
            id: row.id,
            name: row.name.clone(),
            from: row.from_location.clone(),
            category: row.category.clone(),
            title: row.title.clone(),
            slug: row.slug.clone(),
            description: row.description.clone(),
            long_description: row.long_description.clone(),
            status: row.status.clone(),
            meta_title: meta.title,
            meta_tags: meta.tags,
            extra_meta_tags: meta.extra,
            popular_destinations,
            main_packages: main.0,
            faqs,
            images,
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        })
    }

    /// Public theme page view: destination cards with related-package counts
    /// plus the merged package list.
    pub async fn theme_page_public(
        &self,
        row: &ThemePageRow,
    ) -> Result<PublicThemePageView, AppError> {
        let admin = self.theme_page_admin(row).await?;

        let mut popular_destinations = Vec::with_capacity(admin.popular_destinations.len());
        for name in &admin.popular_destinations {
            if let Some(card) = self
                .destination_card(name, &row.from_location, &row.category)
                .await?
            {
                popular_destinations.push(card);
            }
        }

        let curated = self.curated_package_cards(&admin.main_packages).await?;
        let category = if row.category.trim().is_empty() {
            None
        } else {
            Some(row.category.as_str())
        };
        let related = self.resolver.related_packages(&row.name, category).await?;
        let mut discovered = Vec::with_capacity(related.len());
        for pkg in &related {
            discovered.push(self.package_card(pkg).await?);
        }

        Ok(PublicThemePageView {
            id: admin.id,
            name: admin.name,
            from: admin.from,
            category: admin.category,
            title: admin.title,
            slug: admin.slug,
            description: admin.description,
            long_description: admin.long_description,
            meta_title: admin.meta_title,
            meta_tags: admin.meta_tags,
            extra_meta_tags: admin.extra_meta_tags,
            popular_destinations,
            packages: merge_package_cards(curated, discovered),
            faqs: admin.faqs,
            images: admin.images,
        })
    }

    /// Enrich a curated destination name into a display card.
    ///
    /// Slug selection prefers the published variant matching the calling
    /// page's `from` and `category`, then the category variant with no
    /// `from`, then the bare variant, then any. Returns `None` when no
    /// published variant exists (the reference is dropped).
    pub async fn destination_card(
        &self,
        name: &str,
        page_from: &str,
        page_category: &str,
    ) -> Result<Option<DestinationCard>, AppError> {
        let variants = self.repo.list_destinations_by_name(name).await?;
        if variants.is_empty() {
            tracing::warn!(destination = name, "curated destination has no published variant");
            return Ok(None);
        }

        let page_from = page_from.trim();
        let page_category = page_category.trim();

        let chosen = variants
            .iter()
            .find(|d| d.from_location.trim() == page_from && d.category.trim() == page_category)
            .or_else(|| {
                variants.iter().find(|d| {
                    d.from_location.trim().is_empty() && d.category.trim() == page_category
                })
            })
            .or_else(|| {
                variants
                    .iter()
                    .find(|d| d.from_location.trim().is_empty() && d.category.trim().is_empty())
            })
            .unwrap_or(&variants[0]);

        let images = self.repo.image_paths(&chosen.images).await?;
        let category_filter = if page_category.is_empty() {
            None
        } else {
            Some(page_category)
        };
        let count = self
            .resolver
            .related_package_count(name, category_filter)
            .await?;

        Ok(Some(DestinationCard {
            name: chosen.name.clone(),
            slug: Some(chosen.slug.clone()),
            images,
            count,
        }))
    }

    // ==================== BLOGS ====================

    /// Hydrated blog view: taxonomy ids resolved to names element-wise.
    pub async fn blog_view(&self, row: &BlogRow) -> Result<BlogView, AppError> {
        let categories = self
            .repo
            .list_taxonomy_by_ids(TaxonomyFamily::BlogCategories, &row.category)
            .await?;
        let tags = self
            .repo
            .list_taxonomy_by_ids(TaxonomyFamily::BlogTags, &row.tags)
            .await?;

        let featured_image = match row.featured_image {
            Some(id) => self.repo.image_path(id).await?,
            None => None,
        };

        Ok(BlogView {
            id: row.id,
            title: row.title.clone(),
            slug: row.slug.clone(),
            content: row.content.clone(),
            featured_image,
            category: categories.into_iter().map(|e| e.name).collect(),
            tags: tags.into_iter().map(|e| e.name).collect(),
            author: row.author.clone(),
            meta_title: row.meta.title.clone(),
            meta_tags: row.meta.tags.clone(),
            extra_meta_tags: row.meta.extra.clone(),
            status: row.status.clone(),
            created_at: row.created_at.clone(),
            updated_at: row.updated_at.clone(),
        })
    }

    async fn blog_card(&self, row: &BlogRow) -> Result<BlogCard, AppError> {
        let featured_image = match row.featured_image {
            Some(id) => self.repo.image_path(id).await?,
            None => None,
        };
        Ok(BlogCard {
            id: row.id,
            title: row.title.clone(),
            slug: row.slug.clone(),
            featured_image,
            author: row.author.clone(),
            created_at: row.created_at.clone(),
        })
    }

    // ==================== HOMEPAGE ====================

    /// Raw stored homepage content for the admin editor.
    pub async fn homepage_admin(&self) -> Result<HomepageContent, AppError> {
        let record = self.blobs.find_one_by_kind(BlobKind::Homepage).await?;
        match record {
            Some(r) => Ok(self
                .blobs
                .read(r.id, BlobKind::Homepage)
                .await?
                .unwrap_or_default()),
            None => Ok(HomepageContent::default()),
        }
    }

    /// Public homepage: every curated reference section enriched, dangling
    /// references dropped.
    pub async fn homepage_public(&self) -> Result<HomepageView, AppError> {
        let content = self.homepage_admin().await?;

        let mut popular_destinations = Vec::with_capacity(content.popular_destinations.len());
        for name in &content.popular_destinations {
            if let Some(card) = self.destination_card(name, "", "").await? {
                popular_destinations.push(card);
            }
        }

        let popular_packages = self.curated_package_cards(&content.popular_packages).await?;

        let mut theme_sections = Vec::with_capacity(content.theme_sections.len());
        for section in &content.theme_sections {
            let packages = self.curated_package_cards(&section.package_ids).await?;
            theme_sections.push(ThemeSectionView {
                theme: section.theme.clone(),
                packages,
            });
        }

        let mut seasons = Vec::with_capacity(content.seasons.len());
        for name in &content.seasons {
            match self
                .repo
                .find_taxonomy_by_name(TaxonomyFamily::Seasons, name)
                .await?
            {
                Some(entry) => seasons.push(entry),
                None => tracing::warn!(season = %name, "curated season not in taxonomy"),
            }
        }

        let mut domestic = Vec::with_capacity(content.domestic.len());
        for name in &content.domestic {
            if let Some(card) = self.destination_card(name, "", "").await? {
                domestic.push(card);
            }
        }
        let mut international = Vec::with_capacity(content.international.len());
        for name in &content.international {
            if let Some(card) = self.destination_card(name, "", "").await? {
                international.push(card);
            }
        }

        let mut reviews = Vec::with_capacity(content.review_ids.len());
        for id in &content.review_ids {
            match self.repo.get_review(id).await? {
                Some(review) if review.status == crate::models::moderation::APPROVED => {
                    reviews.push(review)
                }
                Some(_) => {}
                None => tracing::warn!(review = %id, "curated review reference dangling"),
            }
        }

        let mut blogs = Vec::with_capacity(content.blog_ids.len());
        for id in &content.blog_ids {
            match self.repo.get_blog(*id).await? {
                Some(blog) if blog.status == status::PUBLISHED => {
                    blogs.push(self.blog_card(&blog).await?)
                }
                Some(_) => {}
                None => tracing::warn!(blog = id, "curated blog reference dangling"),
            }
        }

        Ok(HomepageView {
            banners: content.banners,
            popular_destinations,
            popular_packages,
            theme_sections,
            seasons,
            domestic,
            international,
            reviews,
            blogs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i64, days: i64) -> PackageCard {
        PackageCard {
            id,
            title: format!("pkg-{id}"),
            slug: format!("pkg-{id}"),
            rating: None,
            days,
            nights: days - 1,
            price: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_merge_curated_first_in_curator_order() {
        let merged = merge_package_cards(vec![card(5, 9), card(2, 1)], vec![card(7, 4)]);
        let ids: Vec<i64> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 2, 7]);
    }

    #[test]
    fn test_merge_discovered_sorted_by_days() {
        let merged =
            merge_package_cards(Vec::new(), vec![card(1, 10), card(2, 2), card(3, 6)]);
        let ids: Vec<i64> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_merge_dedup_curated_wins() {
        let merged = merge_package_cards(vec![card(3, 6)], vec![card(3, 6), card(4, 2)]);
        let ids: Vec<i64> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }
}

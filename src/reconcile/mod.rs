//! Composite reconciler: write-side diffing for composite entities.
//!
//! Payloads are sparse. Each scalar present in the payload is compared to
//! the stored value, each blob field is rewritten only when its serialized
//! payload differs, and the final status is derived by re-running the
//! family's completeness rule over the merged (old plus new) field set.
//! Incompleteness downgrades to draft with advisory messages; the write
//! still succeeds. Publishing with zero merged images is the one hard rule.
//! Every composite write runs inside a single transaction, and deleting an
//! entity deletes its owned blobs in the same transaction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::{BlobStore, Repository};
use crate::errors::AppError;
use crate::models::{
    moderation, status, BlobKind, BlogRow, DestinationRow, FaqItem, HomepageContent, MetaInfo,
    PackageRow, SaveBlogRequest, SaveDestinationRequest, SavePackageRequest, SaveThemePageRequest,
    TaxonomyFamily, ThemePageRow, TimeInfo, WriteOutcome,
};
use crate::taxonomy::{self, FallbackPolicy};

/// Maximum images on a destination or theme page.
const MAX_PAGE_IMAGES: usize = 3;

/// Advisory threshold for curated popular packages on a destination.
const POPULAR_PACKAGE_MINIMUM: usize = 4;

/// Write-side mediation over the repository and blob store.
#[derive(Clone)]
pub struct Reconciler {
    repo: Arc<Repository>,
    blobs: BlobStore,
}

impl Reconciler {
    pub fn new(repo: Arc<Repository>, blobs: BlobStore) -> Self {
        Self { repo, blobs }
    }

    // ==================== PACKAGES ====================

    pub async fn create_package(&self, req: SavePackageRequest) -> Result<WriteOutcome, AppError> {
        let title = required_text(req.title.as_deref(), "title")?;
        let requested_status = validate_status(req.status.as_deref())?;

        let slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => self.unique_package_slug(s).await?,
            None => self.unique_package_slug(&taxonomy::slugify(&title)).await?,
        };

        // Make sure referenced taxonomy rows exist before the names are stored
        self.ensure_taxonomy(TaxonomyFamily::Seasons, req.seasons.as_deref()).await?;
        self.ensure_taxonomy(TaxonomyFamily::Themes, req.themes.as_deref()).await?;
        self.ensure_taxonomy(TaxonomyFamily::Includes, req.includes.as_deref()).await?;

        let now = Utc::now().to_rfc3339();
        let mut tx = self.repo.pool().begin().await?;

        let images = self
            .merge_images(&mut tx, &[], req.retained_images.as_ref(), req.images.as_ref(), "packages")
            .await?
            .0;

        let advisories = package_advisories(
            req.destinations.as_deref().unwrap_or(&[]),
            req.includes.as_deref().unwrap_or(&[]),
            req.itinerary.as_deref().unwrap_or(&[]).len(),
            req.journey.as_deref().unwrap_or(&[]).len(),
            images.len(),
        );
        // Missing images soft-downgrade on create; the hard rule applies on
        // update where the caller had a chance to upload
        let final_status = derive_status(&requested_status, &advisories);

        let time = match (req.days, req.nights) {
            (None, None) => None,
            (days, nights) => Some(TimeInfo {
                days: days.unwrap_or(0),
                nights: nights.unwrap_or(0),
            }),
        };
        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            None,
        );

        let row = PackageRow {
            id: 0,
            title,
            slug,
            rating: req.rating,
            max_group: req.max_group,
            customizable: req.customizable.unwrap_or(false),
            marking: req.marking,
            overview: req.overview,
            additional_info: req.additional_info,
            status: final_status.clone(),
            images,
            created_at: now.clone(),
            updated_at: now,
            time_blob: create_blob_opt(&mut tx, BlobKind::Time, time.as_ref()).await?,
            destinations_blob: create_blob_opt(&mut tx, BlobKind::Destinations, req.destinations.as_ref()).await?,
            seasons_blob: create_blob_opt(&mut tx, BlobKind::Seasons, req.seasons.as_ref()).await?,
            themes_blob: create_blob_opt(&mut tx, BlobKind::Themes, req.themes.as_ref()).await?,
            includes_blob: create_blob_opt(&mut tx, BlobKind::Includes, req.includes.as_ref()).await?,
            meta_blob: create_blob_opt(&mut tx, BlobKind::Meta, meta.as_ref()).await?,
            journey_blob: create_blob_opt(&mut tx, BlobKind::Journey, req.journey.as_ref()).await?,
            itinerary_blob: create_blob_opt(&mut tx, BlobKind::Itinerary, req.itinerary.as_ref()).await?,
            inclusions_blob: create_blob_opt(&mut tx, BlobKind::Inclusions, req.inclusions.as_ref()).await?,
            exclusions_blob: create_blob_opt(&mut tx, BlobKind::Exclusions, req.exclusions.as_ref()).await?,
            price_blob: create_blob_opt(&mut tx, BlobKind::Pricing, req.pricing.as_ref()).await?,
            faq_blob: create_blob_opt(&mut tx, BlobKind::Faqs, req.faqs.as_ref()).await?,
        };

        let id = Repository::insert_package(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id, status = %final_status, "package created");
        Ok(WriteOutcome::created(id, &final_status, advisories))
    }

    pub async fn update_package(
        &self,
        slug: &str,
        req: SavePackageRequest,
    ) -> Result<WriteOutcome, AppError> {
        let current = self
            .repo
            .get_package_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Package {slug} not found")))?;

        let requested_status = validate_status(req.status.as_deref())?;

        // Slug change checks uniqueness excluding self
        let new_slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if s != current.slug => {
                if self.repo.package_slug_exists(s, Some(current.id)).await? {
                    return Err(AppError::Conflict(format!("Slug {s} is already in use")));
                }
                s.to_string()
            }
            _ => current.slug.clone(),
        };

        self.ensure_taxonomy(TaxonomyFamily::Seasons, req.seasons.as_deref()).await?;
        self.ensure_taxonomy(TaxonomyFamily::Themes, req.themes.as_deref()).await?;
        self.ensure_taxonomy(TaxonomyFamily::Includes, req.includes.as_deref()).await?;

        // Stored values needed for the merged completeness check
        let stored_time: TimeInfo = self
            .blobs
            .read_or_default(current.time_blob, BlobKind::Time)
            .await?;
        let stored_destinations: crate::models::DestinationRefs = self
            .blobs
            .read_or_default(current.destinations_blob, BlobKind::Destinations)
            .await?;
        let stored_includes: Vec<String> = self
            .blobs
            .read_or_default(current.includes_blob, BlobKind::Includes)
            .await?;
        let stored_itinerary: Vec<crate::models::ItineraryDay> = self
            .blobs
            .read_or_default(current.itinerary_blob, BlobKind::Itinerary)
            .await?;
        let stored_journey: Vec<crate::models::JourneyStop> = self
            .blobs
            .read_or_default(current.journey_blob, BlobKind::Journey)
            .await?;
        let stored_meta: MetaInfo = self
            .blobs
            .read_or_default(current.meta_blob, BlobKind::Meta)
            .await?;

        let mut tx = self.repo.pool().begin().await?;

        let (images, images_changed) = self
            .merge_images(
                &mut tx,
                &current.images,
                req.retained_images.as_ref(),
                req.images.as_ref(),
                "packages",
            )
            .await?;

        let merged_destinations = req
            .destinations
            .clone()
            .unwrap_or_else(|| stored_destinations.0.clone());
        let merged_includes = req.includes.clone().unwrap_or_else(|| stored_includes.clone());
        let merged_itinerary_len = req
            .itinerary
            .as_ref()
            .map(Vec::len)
            .unwrap_or(stored_itinerary.len());
        let merged_journey_len = req
            .journey
            .as_ref()
            .map(Vec::len)
            .unwrap_or(stored_journey.len());

        let advisories = package_advisories(
            &merged_destinations,
            &merged_includes,
            merged_itinerary_len,
            merged_journey_len,
            images.len(),
        );

        let requested = requested_status.unwrap_or_else(|| current.status.clone());
        let final_status = derive_status(&Some(requested.clone()), &advisories);

        // Hard rule: an explicit publish with no merged images is rejected
        if requested == status::PUBLISHED && images.is_empty() {
            return Err(AppError::Validation(
                "images: at least one image is required to publish".to_string(),
            ));
        }

        let time = match (req.days, req.nights) {
            (None, None) => None,
            (days, nights) => Some(TimeInfo {
                days: days.unwrap_or(stored_time.days),
                nights: nights.unwrap_or(stored_time.nights),
            }),
        };
        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            Some(&stored_meta),
        );

        let mut blob_changed = false;
        let (time_blob, c) = sync_blob(&mut tx, current.time_blob, BlobKind::Time, time.as_ref()).await?;
        blob_changed |= c;
        let (destinations_blob, c) =
            sync_blob(&mut tx, current.destinations_blob, BlobKind::Destinations, req.destinations.as_ref()).await?;
        blob_changed |= c;
        let (seasons_blob, c) =
            sync_blob(&mut tx, current.seasons_blob, BlobKind::Seasons, req.seasons.as_ref()).await?;
        blob_changed |= c;
        let (themes_blob, c) =
            sync_blob(&mut tx, current.themes_blob, BlobKind::Themes, req.themes.as_ref()).await?;
        blob_changed |= c;
        let (includes_blob, c) =
            sync_blob(&mut tx, current.includes_blob, BlobKind::Includes, req.includes.as_ref()).await?;
        blob_changed |= c;
        let (meta_blob, c) = sync_blob(&mut tx, current.meta_blob, BlobKind::Meta, meta.as_ref()).await?;
        blob_changed |= c;
        let (journey_blob, c) =
            sync_blob(&mut tx, current.journey_blob, BlobKind::Journey, req.journey.as_ref()).await?;
        blob_changed |= c;
        let (itinerary_blob, c) =
            sync_blob(&mut tx, current.itinerary_blob, BlobKind::Itinerary, req.itinerary.as_ref()).await?;
        blob_changed |= c;
        let (inclusions_blob, c) =
            sync_blob(&mut tx, current.inclusions_blob, BlobKind::Inclusions, req.inclusions.as_ref()).await?;
        blob_changed |= c;
        let (exclusions_blob, c) =
            sync_blob(&mut tx, current.exclusions_blob, BlobKind::Exclusions, req.exclusions.as_ref()).await?;
        blob_changed |= c;
        let (price_blob, c) =
            sync_blob(&mut tx, current.price_blob, BlobKind::Pricing, req.pricing.as_ref()).await?;
        blob_changed |= c;
        let (faq_blob, c) = sync_blob(&mut tx, current.faq_blob, BlobKind::Faqs, req.faqs.as_ref()).await?;
        blob_changed |= c;

        let merged = PackageRow {
            id: current.id,
            title: merge_text(req.title, &current.title),
            slug: new_slug,
            rating: req.rating.or(current.rating),
            max_group: req.max_group.or(current.max_group),
            customizable: req.customizable.unwrap_or(current.customizable),
            marking: req.marking.or(current.marking.clone()),
            overview: req.overview.or(current.overview.clone()),
            additional_info: req.additional_info.or(current.additional_info.clone()),
            status: final_status.clone(),
            images,
            created_at: current.created_at.clone(),
            updated_at: current.updated_at.clone(),
            time_blob,
            destinations_blob,
            seasons_blob,
            themes_blob,
            includes_blob,
            meta_blob,
            journey_blob,
            itinerary_blob,
            inclusions_blob,
            exclusions_blob,
            price_blob,
            faq_blob,
        };

        let scalars_changed = merged.title != current.title
            || merged.slug != current.slug
            || merged.rating != current.rating
            || merged.max_group != current.max_group
            || merged.customizable != current.customizable
            || merged.marking != current.marking
            || merged.overview != current.overview
            || merged.additional_info != current.additional_info
            || merged.status != current.status;

        if !scalars_changed && !blob_changed && !images_changed {
            tx.commit().await?;
            return Ok(WriteOutcome::updated(current.id, false, &current.status, advisories));
        }

        let mut row = merged;
        row.updated_at = Utc::now().to_rfc3339();
        Repository::update_package(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id = current.id, status = %final_status, "package updated");
        Ok(WriteOutcome::updated(current.id, true, &final_status, advisories))
    }

    /// Delete a package and its owned blobs.
    pub async fn delete_package(&self, id: i64) -> Result<bool, AppError> {
        let Some(row) = self.repo.get_package(id).await? else {
            return Ok(false);
        };

        let mut tx = self.repo.pool().begin().await?;
        BlobStore::delete_many(&mut tx, &row.blob_handles()).await?;
        Repository::delete_package(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(id, "package deleted");
        Ok(true)
    }

    /// First free package slug derived from `base` (used by create and the
    /// slug-check endpoint).
    pub async fn unique_package_slug(&self, base: &str) -> Result<String, AppError> {
        let base = if base.is_empty() { "package".to_string() } else { base.to_string() };
        if !self.repo.package_slug_exists(&base, None).await? {
            return Ok(base);
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.repo.package_slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    // ==================== DESTINATIONS ====================

    pub async fn create_destination(
        &self,
        req: SaveDestinationRequest,
    ) -> Result<WriteOutcome, AppError> {
        let name = required_text(req.name.as_deref(), "name")?;
        let from = req.from.as_deref().unwrap_or("").trim().to_string();
        let category = req.category.as_deref().unwrap_or("").trim().to_string();
        let requested_status = validate_status(req.status.as_deref())?;

        if self
            .repo
            .destination_facet_exists(&name, &from, &category, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "A destination with facet {{{name}, {from}, {category}}} already exists"
            )));
        }

        let slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => self.unique_destination_slug(s).await?,
            None => {
                let base = facet_slug_base(&name, &from, &category);
                self.unique_destination_slug(&base).await?
            }
        };

        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            None,
        );

        let now = Utc::now().to_rfc3339();
        let mut tx = self.repo.pool().begin().await?;

        let images = self
            .merge_images(&mut tx, &[], req.retained_images.as_ref(), req.images.as_ref(), "destinations")
            .await?
            .0;
        if images.len() > MAX_PAGE_IMAGES {
            return Err(AppError::Validation(format!(
                "images: at most {MAX_PAGE_IMAGES} images are allowed"
            )));
        }

        let mut advisories = destination_advisories(
            meta.as_ref(),
            req.country.as_deref(),
            req.title.as_deref(),
            req.description.as_deref(),
            req.long_description.as_deref(),
            req.faqs.as_deref(),
            req.popular_packages.as_deref().unwrap_or(&[]).len(),
        );
        let final_status = derive_hard_status(&requested_status, &mut advisories, images.len())?;

        let row = DestinationRow {
            id: 0,
            name,
            from_location: from,
            category,
            country: req.country,
            title: req.title,
            slug,
            description: req.description,
            long_description: req.long_description,
            images,
            status: final_status.clone(),
            created_at: now.clone(),
            updated_at: now,
            meta_blob: create_blob_opt(&mut tx, BlobKind::Meta, meta.as_ref()).await?,
            popular_packages_blob: create_blob_opt(&mut tx, BlobKind::PopularPackages, req.popular_packages.as_ref()).await?,
            main_packages_blob: create_blob_opt(&mut tx, BlobKind::MainPackages, req.main_packages.as_ref()).await?,
            faqs_blob: create_blob_opt(&mut tx, BlobKind::Faqs, req.faqs.as_ref()).await?,
        };

        let id = Repository::insert_destination(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id, status = %final_status, "destination created");
        Ok(WriteOutcome::created(id, &final_status, advisories))
    }

    pub async fn update_destination(
        &self,
        slug: &str,
        req: SaveDestinationRequest,
    ) -> Result<WriteOutcome, AppError> {
        let current = self
            .repo
            .get_destination_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Destination {slug} not found")))?;

        let requested_status = validate_status(req.status.as_deref())?;

        // Facet change re-checks family-wide uniqueness excluding self
        let name = merge_text(req.name.clone(), &current.name);
        let from = req
            .from
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| current.from_location.clone());
        let category = req
            .category
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| current.category.clone());

        let facet_changed = name != current.name
            || from != current.from_location
            || category != current.category;
        if facet_changed
            && self
                .repo
                .destination_facet_exists(&name, &from, &category, Some(current.id))
                .await?
        {
            return Err(AppError::Conflict(format!(
                "A destination with facet {{{name}, {from}, {category}}} already exists"
            )));
        }

        let new_slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if s != current.slug => {
                if self.repo.destination_slug_exists(s, Some(current.id)).await? {
                    return Err(AppError::Conflict(format!("Slug {s} is already in use")));
                }
                s.to_string()
            }
            _ => current.slug.clone(),
        };

        let stored_meta: MetaInfo = self
            .blobs
            .read_or_default(current.meta_blob, BlobKind::Meta)
            .await?;
        let stored_popular: crate::models::PackageRefs = self
            .blobs
            .read_or_default(current.popular_packages_blob, BlobKind::PopularPackages)
            .await?;
        let stored_faqs: Vec<FaqItem> = self
            .blobs
            .read_or_default(current.faqs_blob, BlobKind::Faqs)
            .await?;

        let mut tx = self.repo.pool().begin().await?;

        let (images, images_changed) = self
            .merge_images(
                &mut tx,
                &current.images,
                req.retained_images.as_ref(),
                req.images.as_ref(),
                "destinations",
            )
            .await?;
        if images.len() > MAX_PAGE_IMAGES {
            return Err(AppError::Validation(format!(
                "images: at most {MAX_PAGE_IMAGES} images are allowed"
            )));
        }

        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            Some(&stored_meta),
        );
        let merged_meta = meta.clone().unwrap_or(stored_meta);

        let merged_country = req.country.clone().or(current.country.clone());
        let merged_title = req.title.clone().or(current.title.clone());
        let merged_description = req.description.clone().or(current.description.clone());
        let merged_long = req.long_description.clone().or(current.long_description.clone());
        let merged_faqs = req.faqs.clone().unwrap_or(stored_faqs);
        let merged_popular_len = req
            .popular_packages
            .as_ref()
            .map(Vec::len)
            .unwrap_or(stored_popular.0.len());

        let mut advisories = destination_advisories(
            Some(&merged_meta),
            merged_country.as_deref(),
            merged_title.as_deref(),
            merged_description.as_deref(),
            merged_long.as_deref(),
            Some(&merged_faqs),
            merged_popular_len,
        );
        let requested = Some(requested_status.unwrap_or_else(|| current.status.clone()));
        let final_status = derive_hard_status(&requested, &mut advisories, images.len())?;

        let mut blob_changed = false;
        let (meta_blob, c) = sync_blob(&mut tx, current.meta_blob, BlobKind::Meta, meta.as_ref()).await?;
        blob_changed |= c;
        let (popular_packages_blob, c) = sync_blob(
            &mut tx,
            current.popular_packages_blob,
            BlobKind::PopularPackages,
            req.popular_packages.as_ref(),
        )
        .await?;
        blob_changed |= c;
        let (main_packages_blob, c) = sync_blob(
            &mut tx,
            current.main_packages_blob,
            BlobKind::MainPackages,
            req.main_packages.as_ref(),
        )
        .await?;
        blob_changed |= c;
        let (faqs_blob, c) =
            sync_blob(&mut tx, current.faqs_blob, BlobKind::Faqs, req.faqs.as_ref()).await?;
        blob_changed |= c;

        let merged = DestinationRow {
            id: current.id,
            name,
            from_location: from,
            category,
            country: merged_country,
            title: merged_title,
            slug: new_slug,
            description: merged_description,
            long_description: merged_long,
            images,
            status: final_status.clone(),
            created_at: current.created_at.clone(),
            updated_at: current.updated_at.clone(),
            meta_blob,
            popular_packages_blob,
            main_packages_blob,
            faqs_blob,
        };

        let scalars_changed = merged.name != current.name
            || merged.from_location != current.from_location
            || merged.category != current.category
            || merged.country != current.country
            || merged.title != current.title
            || merged.slug != current.slug
            || merged.description != current.description
            || merged.long_description != current.long_description
            || merged.status != current.status;

        if !scalars_changed && !blob_changed && !images_changed {
            tx.commit().await?;
            return Ok(WriteOutcome::updated(current.id, false, &current.status, advisories));
        }

        let mut row = merged;
        row.updated_at = Utc::now().to_rfc3339();
        Repository::update_destination(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id = current.id, status = %final_status, "destination updated");
        Ok(WriteOutcome::updated(current.id, true, &final_status, advisories))
    }

    pub async fn delete_destination(&self, id: i64) -> Result<bool, AppError> {
        let Some(row) = self.repo.get_destination(id).await? else {
            return Ok(false);
        };

        let mut tx = self.repo.pool().begin().await?;
        BlobStore::delete_many(&mut tx, &row.blob_handles()).await?;
        Repository::delete_destination(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(id, "destination deleted");
        Ok(true)
    }

    async fn unique_destination_slug(&self, base: &str) -> Result<String, AppError> {
        let base = if base.is_empty() { "destination".to_string() } else { base.to_string() };
        if !self.repo.destination_slug_exists(&base, None).await? {
            return Ok(base);
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.repo.destination_slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    // ==================== THEME PAGES ====================

    pub async fn create_theme_page(
        &self,
        req: SaveThemePageRequest,
    ) -> Result<WriteOutcome, AppError> {
        let name = required_text(req.name.as_deref(), "name")?;
        let from = req.from.as_deref().unwrap_or("").trim().to_string();
        let category = req.category.as_deref().unwrap_or("").trim().to_string();
        let requested_status = validate_status(req.status.as_deref())?;

        if self
            .repo
            .theme_page_facet_exists(&name, &from, &category, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "A theme page with facet {{{name}, {from}, {category}}} already exists"
            )));
        }

        let slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => self.unique_theme_page_slug(s).await?,
            None => {
                let base = facet_slug_base(&name, &from, &category);
                self.unique_theme_page_slug(&base).await?
            }
        };

        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            None,
        );

        let now = Utc::now().to_rfc3339();
        let mut tx = self.repo.pool().begin().await?;

        let images = self
            .merge_images(&mut tx, &[], req.retained_images.as_ref(), req.images.as_ref(), "theme-pages")
            .await?
            .0;
        if images.len() > MAX_PAGE_IMAGES {
            return Err(AppError::Validation(format!(
                "images: at most {MAX_PAGE_IMAGES} images are allowed"
            )));
        }

        let mut advisories = theme_page_advisories(
            meta.as_ref(),
            req.title.as_deref(),
            req.description.as_deref(),
            req.long_description.as_deref(),
            req.popular_destinations.as_deref().unwrap_or(&[]).len(),
            req.main_packages.as_deref().unwrap_or(&[]).len(),
            req.faqs.as_deref(),
        );
        let final_status = derive_hard_status(&requested_status, &mut advisories, images.len())?;

        let row = ThemePageRow {
            id: 0,
            name,
            from_location: from,
            category,
            title: req.title,
            slug,
            description: req.description,
            long_description: req.long_description,
            images,
            status: final_status.clone(),
            created_at: now.clone(),
            updated_at: now,
            meta_blob: create_blob_opt(&mut tx, BlobKind::Meta, meta.as_ref()).await?,
            popular_destinations_blob: create_blob_opt(
                &mut tx,
                BlobKind::PopularDestinations,
                req.popular_destinations.as_ref(),
            )
            .await?,
            main_packages_blob: create_blob_opt(&mut tx, BlobKind::MainPackages, req.main_packages.as_ref()).await?,
            faqs_blob: create_blob_opt(&mut tx, BlobKind::Faqs, req.faqs.as_ref()).await?,
        };

        let id = Repository::insert_theme_page(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id, status = %final_status, "theme page created");
        Ok(WriteOutcome::created(id, &final_status, advisories))
    }

    pub async fn update_theme_page(
        &self,
        slug: &str,
        req: SaveThemePageRequest,
    ) -> Result<WriteOutcome, AppError> {
        let current = self
            .repo
            .get_theme_page_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theme page {slug} not found")))?;

        let requested_status = validate_status(req.status.as_deref())?;

        let name = merge_text(req.name.clone(), &current.name);
        let from = req
            .from
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| current.from_location.clone());
        let category = req
            .category
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or_else(|| current.category.clone());

        let facet_changed = name != current.name
            || from != current.from_location
            || category != current.category;
        if facet_changed
            && self
                .repo
                .theme_page_facet_exists(&name, &from, &category, Some(current.id))
                .await?
        {
            return Err(AppError::Conflict(format!(
                "A theme page with facet {{{name}, {from}, {category}}} already exists"
            )));
        }

        let new_slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if s != current.slug => {
                if self.repo.theme_page_slug_exists(s, Some(current.id)).await? {
                    return Err(AppError::Conflict(format!("Slug {s} is already in use")));
                }
                s.to_string()
            }
            _ => current.slug.clone(),
        };

        let stored_meta: MetaInfo = self
            .blobs
            .read_or_default(current.meta_blob, BlobKind::Meta)
            .await?;
        let stored_destinations: Vec<String> = self
            .blobs
            .read_or_default(current.popular_destinations_blob, BlobKind::PopularDestinations)
            .await?;
        let stored_main: crate::models::PackageRefs = self
            .blobs
            .read_or_default(current.main_packages_blob, BlobKind::MainPackages)
            .await?;
        let stored_faqs: Vec<FaqItem> = self
            .blobs
            .read_or_default(current.faqs_blob, BlobKind::Faqs)
            .await?;

        let mut tx = self.repo.pool().begin().await?;

        let (images, images_changed) = self
            .merge_images(
                &mut tx,
                &current.images,
                req.retained_images.as_ref(),
                req.images.as_ref(),
                "theme-pages",
            )
            .await?;
        if images.len() > MAX_PAGE_IMAGES {
            return Err(AppError::Validation(format!(
                "images: at most {MAX_PAGE_IMAGES} images are allowed"
            )));
        }

        let meta = build_meta(
            req.meta_title.as_deref(),
            req.meta_tags.as_deref(),
            req.extra_meta_tags.as_deref(),
            Some(&stored_meta),
        );
        let merged_meta = meta.clone().unwrap_or(stored_meta);

        let merged_title = req.title.clone().or(current.title.clone());
        let merged_description = req.description.clone().or(current.description.clone());
        let merged_long = req.long_description.clone().or(current.long_description.clone());
        let merged_destinations_len = req
            .popular_destinations
            .as_ref()
            .map(Vec::len)
            .unwrap_or(stored_destinations.len());
        let merged_main_len = req
            .main_packages
            .as_ref()
            .map(Vec::len)
            .unwrap_or(stored_main.0.len());
        let merged_faqs = req.faqs.clone().unwrap_or(stored_faqs);

        let mut advisories = theme_page_advisories(
            Some(&merged_meta),
            merged_title.as_deref(),
            merged_description.as_deref(),
            merged_long.as_deref(),
            merged_destinations_len,
            merged_main_len,
            Some(&merged_faqs),
        );
        let requested = Some(requested_status.unwrap_or_else(|| current.status.clone()));
        let final_status = derive_hard_status(&requested, &mut advisories, images.len())?;

        let mut blob_changed = false;
        let (meta_blob, c) = sync_blob(&mut tx, current.meta_blob, BlobKind::Meta, meta.as_ref()).await?;
        blob_changed |= c;
        let (popular_destinations_blob, c) = sync_blob(
            &mut tx,
            current.popular_destinations_blob,
            BlobKind::PopularDestinations,
            req.popular_destinations.as_ref(),
        )
        .await?;
        blob_changed |= c;
        let (main_packages_blob, c) = sync_blob(
            &mut tx,
            current.main_packages_blob,
            BlobKind::MainPackages,
            req.main_packages.as_ref(),
        )
        .await?;
        blob_changed |= c;
        let (faqs_blob, c) =
            sync_blob(&mut tx, current.faqs_blob, BlobKind::Faqs, req.faqs.as_ref()).await?;
        blob_changed |= c;

        let merged = ThemePageRow {
            id: current.id,
            name,
            from_location: from,
            category,
            title: merged_title,
            slug: new_slug,
            description: merged_description,
            long_description: merged_long,
            images,
            status: final_status.clone(),
            created_at: current.created_at.clone(),
            updated_at: current.updated_at.clone(),
            meta_blob,
            popular_destinations_blob,
            main_packages_blob,
            faqs_blob,
        };

        let scalars_changed = merged.name != current.name
            || merged.from_location != current.from_location
            || merged.category != current.category
            || merged.title != current.title
            || merged.slug != current.slug
            || merged.description != current.description
            || merged.long_description != current.long_description
            || merged.status != current.status;

        if !scalars_changed && !blob_changed && !images_changed {
            tx.commit().await?;
            return Ok(WriteOutcome::updated(current.id, false, &current.status, advisories));
        }

        let mut row = merged;
        row.updated_at = Utc::now().to_rfc3339();
        Repository::update_theme_page(&mut tx, &row).await?;
        tx.commit().await?;

        tracing::info!(id = current.id, status = %final_status, "theme page updated");
        Ok(WriteOutcome::updated(current.id, true, &final_status, advisories))
    }

    pub async fn delete_theme_page(&self, id: i64) -> Result<bool, AppError> {
        let Some(row) = self.repo.get_theme_page(id).await? else {
            return Ok(false);
        };

        let mut tx = self.repo.pool().begin().await?;
        BlobStore::delete_many(&mut tx, &row.blob_handles()).await?;
        Repository::delete_theme_page(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(id, "theme page deleted");
        Ok(true)
    }

    async fn unique_theme_page_slug(&self, base: &str) -> Result<String, AppError> {
        let base = if base.is_empty() { "theme".to_string() } else { base.to_string() };
        if !self.repo.theme_page_slug_exists(&base, None).await? {
            return Ok(base);
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.repo.theme_page_slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    // ==================== BLOGS ====================

    pub async fn create_blog(&self, req: SaveBlogRequest) -> Result<WriteOutcome, AppError> {
        let title = required_text(req.title.as_deref(), "title")?;
        let content = required_text(req.content.as_deref(), "content")?;
        let final_status = validate_status(req.status.as_deref())?
            .unwrap_or_else(|| status::DRAFT.to_string());

        let slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => self.unique_blog_slug(s).await?,
            None => self.unique_blog_slug(&taxonomy::slugify(&title)).await?,
        };

        let category = taxonomy::find_or_create(
            &self.repo,
            TaxonomyFamily::BlogCategories,
            req.category.as_deref().unwrap_or(&[]),
            &FallbackPolicy::default_id(1),
        )
        .await?;
        let tags = taxonomy::find_or_create(
            &self.repo,
            TaxonomyFamily::BlogTags,
            req.tags.as_deref().unwrap_or(&[]),
            &FallbackPolicy::default_id(1),
        )
        .await?;

        let featured_image = self.register_single_image(req.featured_image.as_deref(), "blogs").await?;

        let now = Utc::now().to_rfc3339();
        let row = BlogRow {
            id: 0,
            title,
            slug,
            content,
            featured_image,
            category,
            tags,
            author: req.author,
            meta: build_meta(
                req.meta_title.as_deref(),
                req.meta_tags.as_deref(),
                req.extra_meta_tags.as_deref(),
                None,
            )
            .unwrap_or_default(),
            status: final_status.clone(),
            created_at: now.clone(),
            updated_at: now,
        };

        let id = self.repo.insert_blog(&row).await?;
        tracing::info!(id, status = %final_status, "blog created");
        Ok(WriteOutcome::created(id, &final_status, Vec::new()))
    }

    pub async fn update_blog(&self, id: i64, req: SaveBlogRequest) -> Result<WriteOutcome, AppError> {
        let current = self
            .repo
            .get_blog(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))?;

        let new_slug = match req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if s != current.slug => {
                if self.repo.blog_slug_exists(s, Some(current.id)).await? {
                    return Err(AppError::Conflict(format!("Slug {s} is already in use")));
                }
                s.to_string()
            }
            _ => current.slug.clone(),
        };

        let category = match req.category.as_deref() {
            Some(names) => {
                taxonomy::find_or_create(
                    &self.repo,
                    TaxonomyFamily::BlogCategories,
                    names,
                    &FallbackPolicy::default_id(1),
                )
                .await?
            }
            None => current.category.clone(),
        };
        let tags = match req.tags.as_deref() {
            Some(names) => {
                taxonomy::find_or_create(
                    &self.repo,
                    TaxonomyFamily::BlogTags,
                    names,
                    &FallbackPolicy::default_id(1),
                )
                .await?
            }
            None => current.tags.clone(),
        };

        let featured_image = match req.featured_image.as_deref() {
            Some(file) => self.register_single_image(Some(file), "blogs").await?,
            None => current.featured_image,
        };

        let final_status = validate_status(req.status.as_deref())?
            .unwrap_or_else(|| current.status.clone());

        let merged = BlogRow {
            id: current.id,
            title: merge_text(req.title, &current.title),
            slug: new_slug,
            content: merge_text(req.content, &current.content),
            featured_image,
            category,
            tags,
            author: req.author.or(current.author.clone()),
            meta: build_meta(
                req.meta_title.as_deref(),
                req.meta_tags.as_deref(),
                req.extra_meta_tags.as_deref(),
                Some(&current.meta),
            )
            .unwrap_or_else(|| current.meta.clone()),
            status: final_status.clone(),
            created_at: current.created_at.clone(),
            updated_at: current.updated_at.clone(),
        };

        let changed = merged.title != current.title
            || merged.slug != current.slug
            || merged.content != current.content
            || merged.featured_image != current.featured_image
            || merged.category != current.category
            || merged.tags != current.tags
            || merged.author != current.author
            || merged.meta != current.meta
            || merged.status != current.status;

        if !changed {
            return Ok(WriteOutcome::updated(current.id, false, &current.status, Vec::new()));
        }

        let mut row = merged;
        row.updated_at = Utc::now().to_rfc3339();
        self.repo.update_blog(&row).await?;

        tracing::info!(id, status = %final_status, "blog updated");
        Ok(WriteOutcome::updated(id, true, &final_status, Vec::new()))
    }

    pub async fn delete_blog(&self, id: i64) -> Result<bool, AppError> {
        if self.repo.get_blog(id).await?.is_none() {
            return Ok(false);
        }
        self.repo.delete_blog(id).await?;
        tracing::info!(id, "blog deleted");
        Ok(true)
    }

    async fn unique_blog_slug(&self, base: &str) -> Result<String, AppError> {
        let base = if base.is_empty() { "post".to_string() } else { base.to_string() };
        if !self.repo.blog_slug_exists(&base, None).await? {
            return Ok(base);
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.repo.blog_slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    // ==================== HOMEPAGE ====================

    /// Save the homepage singleton blob; creates it on first save.
    pub async fn save_homepage(&self, content: HomepageContent) -> Result<WriteOutcome, AppError> {
        let existing = self.blobs.find_one_by_kind(BlobKind::Homepage).await?;
        let mut tx = self.repo.pool().begin().await?;

        let (id, changed) = match existing {
            Some(record) => {
                let changed =
                    BlobStore::update_if_changed(&mut tx, record.id, BlobKind::Homepage, &content)
                        .await?;
                (record.id, changed)
            }
            None => {
                let id = BlobStore::create(&mut tx, BlobKind::Homepage, &content).await?;
                (id, true)
            }
        };

        tx.commit().await?;
        if changed {
            tracing::info!(blob = id, "homepage saved");
        }
        Ok(WriteOutcome::updated(id, changed, status::PUBLISHED, Vec::new()))
    }

    // ==================== REVIEWS / COMMENTS MODERATION ====================

    pub async fn moderate_review(&self, id: &str, new_status: &str) -> Result<(), AppError> {
        if !moderation::is_valid(new_status) {
            return Err(AppError::Validation(format!(
                "status: {new_status} is not a valid moderation status"
            )));
        }
        if !self.repo.set_review_status(id, new_status).await? {
            return Err(AppError::NotFound(format!("Review {id} not found")));
        }
        tracing::info!(review = id, status = new_status, "review moderated");
        Ok(())
    }

    pub async fn moderate_comment(&self, id: i64, new_status: &str) -> Result<(), AppError> {
        if !moderation::is_valid(new_status) {
            return Err(AppError::Validation(format!(
                "status: {new_status} is not a valid moderation status"
            )));
        }
        if !self.repo.set_comment_status(id, new_status).await? {
            return Err(AppError::NotFound(format!("Comment {id} not found")));
        }
        tracing::info!(comment = id, status = new_status, "comment moderated");
        Ok(())
    }

    // ==================== SHARED ====================

    /// Resolve retained stored paths plus newly uploaded files into the
    /// merged image handle list. Retention is by path; stored handles whose
    /// path is not retained are dropped. Uploads are registered under the
    /// family folder and appended.
    async fn merge_images(
        &self,
        conn: &mut SqliteConnection,
        existing: &[i64],
        retained: Option<&Vec<String>>,
        uploads: Option<&Vec<String>>,
        folder: &str,
    ) -> Result<(Vec<i64>, bool), AppError> {
        let mut merged: Vec<i64> = match retained {
            None => existing.to_vec(),
            Some(paths) => {
                let keep: HashSet<&str> = paths.iter().map(String::as_str).collect();
                let mut kept = Vec::new();
                for id in existing {
                    match self.repo.image_path(*id).await? {
                        Some(path) if keep.contains(path.as_str()) => kept.push(*id),
                        Some(_) => {}
                        None => tracing::warn!(image = id, "stored image handle dangling"),
                    }
                }
                kept
            }
        };

        if let Some(files) = uploads {
            for file in files {
                let file = file.trim();
                if file.is_empty() {
                    continue;
                }
                let path = format!("/uploads/{folder}/{file}");
                let id = Repository::register_image(conn, &path).await?;
                merged.push(id);
            }
        }

        let changed = merged != existing;
        Ok((merged, changed))
    }

    async fn register_single_image(
        &self,
        file: Option<&str>,
        folder: &str,
    ) -> Result<Option<i64>, AppError> {
        let Some(file) = file.map(str::trim).filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        let mut conn = self.repo.pool().acquire().await?;
        let path = format!("/uploads/{folder}/{file}");
        let id = Repository::register_image(&mut conn, &path).await?;
        Ok(Some(id))
    }

    async fn ensure_taxonomy(
        &self,
        family: TaxonomyFamily,
        names: Option<&[String]>,
    ) -> Result<(), AppError> {
        if let Some(names) = names {
            taxonomy::find_or_create(&self.repo, family, names, &FallbackPolicy::none()).await?;
        }
        Ok(())
    }
}

// ==================== FIELD HELPERS ====================

fn required_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(v.to_string()),
        None => Err(AppError::Validation(format!("{field}: a non-empty value is required"))),
    }
}

fn validate_status(value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s == status::PUBLISHED || s == status::DRAFT => Ok(Some(s.to_string())),
        Some(s) => Err(AppError::Validation(format!("status: {s} is not a valid status"))),
    }
}

fn merge_text(new: Option<String>, current: &str) -> String {
    match new.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => current.to_string(),
    }
}

/// Combine sparse meta fields with the stored value. Returns `None` when the
/// payload touched none of them.
fn build_meta(
    title: Option<&str>,
    tags: Option<&str>,
    extra: Option<&str>,
    current: Option<&MetaInfo>,
) -> Option<MetaInfo> {
    if title.is_none() && tags.is_none() && extra.is_none() {
        return None;
    }
    let base = current.cloned().unwrap_or_default();
    Some(MetaInfo {
        title: title.map(str::to_string).unwrap_or(base.title),
        tags: tags.map(str::to_string).unwrap_or(base.tags),
        extra: extra.map(str::to_string).unwrap_or(base.extra),
    })
}

fn facet_slug_base(name: &str, from: &str, category: &str) -> String {
    let mut parts = vec![name.to_string()];
    if !category.is_empty() {
        parts.push(category.to_string());
    }
    if !from.is_empty() {
        parts.push(format!("from {from}"));
    }
    taxonomy::slugify(&parts.join(" "))
}

/// Force draft when the completeness rule left advisories.
fn derive_status(requested: &Option<String>, advisories: &[String]) -> String {
    let requested = requested.clone().unwrap_or_else(|| status::DRAFT.to_string());
    if advisories.is_empty() {
        requested
    } else {
        status::DRAFT.to_string()
    }
}

/// Status derivation for families with the hard publish-image rule. The
/// popular-package advisory never downgrades; everything else does.
fn derive_hard_status(
    requested: &Option<String>,
    advisories: &mut Vec<String>,
    image_count: usize,
) -> Result<String, AppError> {
    let requested = requested.clone().unwrap_or_else(|| status::DRAFT.to_string());

    if requested == status::PUBLISHED && image_count == 0 {
        return Err(AppError::Validation(
            "images: at least one image is required to publish".to_string(),
        ));
    }

    let downgrading: Vec<&String> = advisories
        .iter()
        .filter(|a| !a.starts_with("popularPackages"))
        .collect();
    if downgrading.is_empty() {
        Ok(requested)
    } else {
        Ok(status::DRAFT.to_string())
    }
}

// ==================== COMPLETENESS RULES ====================

fn package_advisories(
    destinations: &[i64],
    includes: &[String],
    itinerary_len: usize,
    journey_len: usize,
    image_count: usize,
) -> Vec<String> {
    let mut advisories = Vec::new();
    if destinations.is_empty() {
        advisories.push("destinations: at least one destination is required".to_string());
    }
    if includes.is_empty() {
        advisories.push("includes: at least one include is required".to_string());
    }
    if itinerary_len == 0 {
        advisories.push("itinerary: at least one day is required".to_string());
    }
    if journey_len == 0 {
        advisories.push("journey: at least one stop is required".to_string());
    }
    if image_count == 0 {
        advisories.push("images: at least one image is required to publish".to_string());
    }
    advisories
}

fn destination_advisories(
    meta: Option<&MetaInfo>,
    country: Option<&str>,
    title: Option<&str>,
    description: Option<&str>,
    long_description: Option<&str>,
    faqs: Option<&[FaqItem]>,
    popular_package_count: usize,
) -> Vec<String> {
    let mut advisories = Vec::new();
    if meta.map(MetaInfo::is_empty).unwrap_or(true) {
        advisories.push("meta: meta title and tags are required".to_string());
    }
    if is_blank(country) {
        advisories.push("country: a country is required".to_string());
    }
    if is_blank(title) {
        advisories.push("title: a title is required".to_string());
    }
    if is_blank(description) {
        advisories.push("description: a description is required".to_string());
    }
    if is_blank(long_description) {
        advisories.push("longDescription: a long description is required".to_string());
    }
    if faqs.map(|f| f.is_empty()).unwrap_or(true) {
        advisories.push("faqs: at least one FAQ is required".to_string());
    }
    if popular_package_count < POPULAR_PACKAGE_MINIMUM {
        advisories.push(format!(
            "popularPackages: at least {POPULAR_PACKAGE_MINIMUM} popular packages are recommended"
        ));
    }
    advisories
}

#[allow(clippy::too_many_arguments)]
fn theme_page_advisories(
    meta: Option<&MetaInfo>,
    title: Option<&str>,
    description: Option<&str>,
    long_description: Option<&str>,
    popular_destination_count: usize,
    main_package_count: usize,
    faqs: Option<&[FaqItem]>,
) -> Vec<String> {
    let mut advisories = Vec::new();
    if meta.map(MetaInfo::is_empty).unwrap_or(true) {
        advisories.push("meta: meta title and tags are required".to_string());
    }
    if is_blank(title) {
        advisories.push("title: a title is required".to_string());
    }
    if is_blank(description) {
        advisories.push("description: a description is required".to_string());
    }
    if is_blank(long_description) {
        advisories.push("longDescription: a long description is required".to_string());
    }
    if popular_destination_count == 0 {
        advisories.push("popularDestinations: at least one destination is required".to_string());
    }
    if main_package_count == 0 {
        advisories.push("mainPackages: at least one package is required".to_string());
    }
    if faqs.map(|f| f.is_empty()).unwrap_or(true) {
        advisories.push("faqs: at least one FAQ is required".to_string());
    }
    advisories
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).filter(|v| !v.is_empty()).is_none()
}

// ==================== BLOB DIFF PRIMITIVES ====================

/// Create a blob for a provided field on the create path.
async fn create_blob_opt<T: Serialize>(
    conn: &mut SqliteConnection,
    kind: BlobKind,
    value: Option<&T>,
) -> Result<Option<i64>, AppError> {
    match value {
        Some(v) => Ok(Some(BlobStore::create(conn, kind, v).await?)),
        None => Ok(None),
    }
}

/// Diff-and-write for one blob field on the update path. A field absent from
/// the payload keeps its handle untouched; a present field updates the
/// existing blob in place (handles never change) or creates one if the field
/// had no blob yet.
async fn sync_blob<T: Serialize>(
    conn: &mut SqliteConnection,
    handle: Option<i64>,
    kind: BlobKind,
    value: Option<&T>,
) -> Result<(Option<i64>, bool), AppError> {
    match (handle, value) {
        (h, None) => Ok((h, false)),
        (Some(h), Some(v)) => {
            let changed = BlobStore::update_if_changed(conn, h, kind, v).await?;
            Ok((Some(h), changed))
        }
        (None, Some(v)) => {
            let h = BlobStore::create(conn, kind, v).await?;
            Ok((Some(h), true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_advisories_complete() {
        let advisories = package_advisories(&[1], &["Meals".into()], 2, 1, 1);
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_package_advisories_missing_images() {
        let advisories = package_advisories(&[1], &["Meals".into()], 2, 1, 0);
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].contains("image"));
    }

    #[test]
    fn test_derive_status_downgrades_on_advisory() {
        let advisories = vec!["images: at least one image is required to publish".to_string()];
        assert_eq!(
            derive_status(&Some(status::PUBLISHED.to_string()), &advisories),
            status::DRAFT
        );
        assert_eq!(derive_status(&Some(status::PUBLISHED.to_string()), &[]), status::PUBLISHED);
    }

    #[test]
    fn test_derive_hard_status_rejects_publish_without_images() {
        let mut advisories = Vec::new();
        let result =
            derive_hard_status(&Some(status::PUBLISHED.to_string()), &mut advisories, 0);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let ok = derive_hard_status(&Some(status::DRAFT.to_string()), &mut advisories, 0);
        assert_eq!(ok.unwrap(), status::DRAFT);
    }

    #[test]
    fn test_popular_package_advisory_never_downgrades() {
        let mut advisories =
            vec!["popularPackages: at least 4 popular packages are recommended".to_string()];
        let result =
            derive_hard_status(&Some(status::PUBLISHED.to_string()), &mut advisories, 2);
        assert_eq!(result.unwrap(), status::PUBLISHED);
    }

    #[test]
    fn test_build_meta_untouched_payload() {
        assert!(build_meta(None, None, None, None).is_none());
        let stored = MetaInfo {
            title: "old".into(),
            tags: "a,b".into(),
            extra: String::new(),
        };
        let merged = build_meta(Some("new"), None, None, Some(&stored)).unwrap();
        assert_eq!(merged.title, "new");
        assert_eq!(merged.tags, "a,b");
    }

    #[test]
    fn test_facet_slug_base() {
        assert_eq!(facet_slug_base("Goa", "", ""), "goa");
        assert_eq!(facet_slug_base("Goa", "Delhi", "Beach"), "goa-beach-from-delhi");
    }

    #[test]
    fn test_validate_status() {
        assert_eq!(validate_status(None).unwrap(), None);
        assert_eq!(
            validate_status(Some("published")).unwrap(),
            Some("published".to_string())
        );
        assert!(validate_status(Some("archived")).is_err());
    }
}

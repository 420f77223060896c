//! Database repository for CRUD operations.
//!
//! Reads go through the pool. Composite-entity writes take a connection so
//! the reconciler can group the row write and its blob writes in one
//! transaction.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    BlogRow, CommentRow, DestinationRow, MetaInfo, PackageRow, ReviewView, TaxonomyEntry,
    TaxonomyFamily, ThemePageRow,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== PACKAGE OPERATIONS ====================

    /// List all packages, newest first.
    pub async fn list_packages(&self) -> Result<Vec<PackageRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(package_from_row).collect())
    }

    /// List published packages only.
    pub async fn list_published_packages(&self) -> Result<Vec<PackageRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE status = 'published' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(package_from_row).collect())
    }

    pub async fn get_package(&self, id: i64) -> Result<Option<PackageRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(package_from_row))
    }

    pub async fn get_package_by_slug(&self, slug: &str) -> Result<Option<PackageRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(package_from_row))
    }

    pub async fn package_slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        slug_exists(&self.pool, "packages", slug, exclude_id).await
    }

    /// Insert a package row; `row.id` is ignored and the new id returned.
    pub async fn insert_package(
        conn: &mut SqliteConnection,
        row: &PackageRow,
    ) -> Result<i64, AppError> {
        let images = serde_json::to_string(&row.images)?;
        let result = sqlx::query(
            r#"
            INSERT INTO packages (
                title, slug, rating, max_group, customizable, marking, overview,
                additional_info, status, images, created_at, updated_at,
                time_blob, destinations_blob, seasons_blob, themes_blob,
                includes_blob, meta_blob, journey_blob, itinerary_blob,
                inclusions_blob, exclusions_blob, price_blob, faq_blob
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.title)
        .bind(&row.slug)
        .bind(row.rating)
        .bind(row.max_group)
        .bind(row.customizable as i32)
        .bind(&row.marking)
        .bind(&row.overview)
        .bind(&row.additional_info)
        .bind(&row.status)
        .bind(&images)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .bind(row.time_blob)
        .bind(row.destinations_blob)
        .bind(row.seasons_blob)
        .bind(row.themes_blob)
        .bind(row.includes_blob)
        .bind(row.meta_blob)
        .bind(row.journey_blob)
        .bind(row.itinerary_blob)
        .bind(row.inclusions_blob)
        .bind(row.exclusions_blob)
        .bind(row.price_blob)
        .bind(row.faq_blob)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Full-row update of a package by id.
    pub async fn update_package(
        conn: &mut SqliteConnection,
        row: &PackageRow,
    ) -> Result<(), AppError> {
        let images = serde_json::to_string(&row.images)?;
        sqlx::query(
            r#"
            UPDATE packages SET
                title = ?, slug = ?, rating = ?, max_group = ?, customizable = ?,
                marking = ?, overview = ?, additional_info = ?, status = ?,
                images = ?, updated_at = ?,
                time_blob = ?, destinations_blob = ?, seasons_blob = ?,
                themes_blob = ?, includes_blob = ?, meta_blob = ?,
                journey_blob = ?, itinerary_blob = ?, inclusions_blob = ?,
                exclusions_blob = ?, price_blob = ?, faq_blob = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.title)
        .bind(&row.slug)
        .bind(row.rating)
        .bind(row.max_group)
        .bind(row.customizable as i32)
        .bind(&row.marking)
        .bind(&row.overview)
        .bind(&row.additional_info)
        .bind(&row.status)
        .bind(&images)
        .bind(&row.updated_at)
        .bind(row.time_blob)
        .bind(row.destinations_blob)
        .bind(row.seasons_blob)
        .bind(row.themes_blob)
        .bind(row.includes_blob)
        .bind(row.meta_blob)
        .bind(row.journey_blob)
        .bind(row.itinerary_blob)
        .bind(row.inclusions_blob)
        .bind(row.exclusions_blob)
        .bind(row.price_blob)
        .bind(row.faq_blob)
        .bind(row.id)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn delete_package(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM packages WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    // ==================== DESTINATION OPERATIONS ====================

    pub async fn list_destinations(&self) -> Result<Vec<DestinationRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(destination_from_row).collect())
    }

    /// Published destinations sharing a facet name (sibling and card lookups).
    pub async fn list_destinations_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<DestinationRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE name = ? AND status = 'published'"
        ))
        .bind(name.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(destination_from_row).collect())
    }

    pub async fn get_destination(&self, id: i64) -> Result<Option<DestinationRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(destination_from_row))
    }

    pub async fn get_destination_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<DestinationRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(destination_from_row))
    }

    pub async fn destination_slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        slug_exists(&self.pool, "destinations", slug, exclude_id).await
    }

    /// Check whether another destination already holds this facet.
    pub async fn destination_facet_exists(
        &self,
        name: &str,
        from_location: &str,
        category: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        facet_exists(&self.pool, "destinations", name, from_location, category, exclude_id).await
    }

    pub async fn insert_destination(
        conn: &mut SqliteConnection,
        row: &DestinationRow,
    ) -> Result<i64, AppError> {
        let images = serde_json::to_string(&row.images)?;
        let result = sqlx::query(
            r#"
            INSERT INTO destinations (
                name, from_location, category, country, title, slug, description,
                long_description, images, status, created_at, updated_at,
                meta_blob, popular_packages_blob, main_packages_blob, faqs_blob
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.name)
        .bind(&row.from_location)
        .bind(&row.category)
        .bind(&row.country)
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.description)
        .bind(&row.long_description)
        .bind(&images)
        .bind(&row.status)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .bind(row.meta_blob)
        .bind(row.popular_packages_blob)
        .bind(row.main_packages_blob)
        .bind(row.faqs_blob)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_destination(
        conn: &mut SqliteConnection,
        row: &DestinationRow,
    ) -> Result<(), AppError> {
        let images = serde_json::to_string(&row.images)?;
        sqlx::query(
            r#"
            UPDATE destinations SET
                name = ?, from_location = ?, category = ?, country = ?, title = ?,
                slug = ?, description = ?, long_description = ?, images = ?,
                status = ?, updated_at = ?,
                meta_blob = ?, popular_packages_blob = ?, main_packages_blob = ?,
                faqs_blob = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.name)
        .bind(&row.from_location)
        .bind(&row.category)
        .bind(&row.country)
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.description)
        .bind(&row.long_description)
        .bind(&images)
        .bind(&row.status)
        .bind(&row.updated_at)
        .bind(row.meta_blob)
        .bind(row.popular_packages_blob)
        .bind(row.main_packages_blob)
        .bind(row.faqs_blob)
        .bind(row.id)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn delete_destination(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM destinations WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    // ==================== THEME PAGE OPERATIONS ====================

    pub async fn list_theme_pages(&self) -> Result<Vec<ThemePageRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {THEME_PAGE_COLUMNS} FROM theme_pages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(theme_page_from_row).collect())
    }

    pub async fn get_theme_page(&self, id: i64) -> Result<Option<ThemePageRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {THEME_PAGE_COLUMNS} FROM theme_pages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(theme_page_from_row))
    }

    pub async fn get_theme_page_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ThemePageRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {THEME_PAGE_COLUMNS} FROM theme_pages WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(theme_page_from_row))
    }

    /// Published theme pages sharing a facet name.
    pub async fn list_theme_pages_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<ThemePageRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {THEME_PAGE_COLUMNS} FROM theme_pages WHERE name = ? AND status = 'published'"
        ))
        .bind(name.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(theme_page_from_row).collect())
    }

    pub async fn theme_page_slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        slug_exists(&self.pool, "theme_pages", slug, exclude_id).await
    }

    pub async fn theme_page_facet_exists(
        &self,
        name: &str,
        from_location: &str,
        category: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        facet_exists(&self.pool, "theme_pages", name, from_location, category, exclude_id).await
    }

    pub async fn insert_theme_page(
        conn: &mut SqliteConnection,
        row: &ThemePageRow,
    ) -> Result<i64, AppError> {
        let images = serde_json::to_string(&row.images)?;
        let result = sqlx::query(
            r#"
            INSERT INTO theme_pages (
                name, from_location, category, title, slug, description,
                long_description, images, status, created_at, updated_at,
                meta_blob, popular_destinations_blob, main_packages_blob, faqs_blob
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.name)
        .bind(&row.from_location)
        .bind(&row.category)
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.description)
        .bind(&row.long_description)
        .bind(&images)
        .bind(&row.status)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .bind(row.meta_blob)
        .bind(row.popular_destinations_blob)
        .bind(row.main_packages_blob)
        .bind(row.faqs_blob)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_theme_page(
        conn: &mut SqliteConnection,
        row: &ThemePageRow,
    ) -> Result<(), AppError> {
        let images = serde_json::to_string(&row.images)?;
        sqlx::query(
            r#"
            UPDATE theme_pages SET
                name = ?, from_location = ?, category = ?, title = ?, slug = ?,
                description = ?, long_description = ?, images = ?, status = ?,
                updated_at = ?,
                meta_blob = ?, popular_destinations_blob = ?, main_packages_blob = ?,
                faqs_blob = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.name)
        .bind(&row.from_location)
        .bind(&row.category)
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.description)
        .bind(&row.long_description)
        .bind(&images)
        .bind(&row.status)
        .bind(&row.updated_at)
        .bind(row.meta_blob)
        .bind(row.popular_destinations_blob)
        .bind(row.main_packages_blob)
        .bind(row.faqs_blob)
        .bind(row.id)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn delete_theme_page(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM theme_pages WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    // ==================== BLOG OPERATIONS ====================

    pub async fn list_blogs(&self) -> Result<Vec<BlogRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blog_from_row).collect())
    }

    pub async fn list_published_blogs(&self) -> Result<Vec<BlogRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE status = 'published' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blog_from_row).collect())
    }

    pub async fn get_blog(&self, id: i64) -> Result<Option<BlogRow>, AppError> {
        let row = sqlx::query(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(blog_from_row))
    }

    pub async fn get_blog_by_slug(&self, slug: &str) -> Result<Option<BlogRow>, AppError> {
        let row = sqlx::query(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(blog_from_row))
    }

    pub async fn blog_slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        slug_exists(&self.pool, "blogs", slug, exclude_id).await
    }

    pub async fn insert_blog(&self, row: &BlogRow) -> Result<i64, AppError> {
        let category = serde_json::to_string(&row.category)?;
        let tags = serde_json::to_string(&row.tags)?;
        let meta = serde_json::to_string(&row.meta)?;

        let result = sqlx::query(
            r#"
            INSERT INTO blogs (
                title, slug, content, featured_image, category, tags, author,
                meta, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.content)
        .bind(row.featured_image)
        .bind(&category)
        .bind(&tags)
        .bind(&row.author)
        .bind(&meta)
        .bind(&row.status)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_blog(&self, row: &BlogRow) -> Result<(), AppError> {
        let category = serde_json::to_string(&row.category)?;
        let tags = serde_json::to_string(&row.tags)?;
        let meta = serde_json::to_string(&row.meta)?;

        sqlx::query(
            r#"
            UPDATE blogs SET
                title = ?, slug = ?, content = ?, featured_image = ?, category = ?,
                tags = ?, author = ?, meta = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.title)
        .bind(&row.slug)
        .bind(&row.content)
        .bind(row.featured_image)
        .bind(&category)
        .bind(&tags)
        .bind(&row.author)
        .bind(&meta)
        .bind(&row.status)
        .bind(&row.updated_at)
        .bind(row.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM blog_comments WHERE blog_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== COMMENT OPERATIONS ====================

    pub async fn create_comment(
        &self,
        blog_id: i64,
        author: &str,
        email: Option<&str>,
        phone: Option<&str>,
        content: &str,
        parent_id: Option<i64>,
        status: &str,
        is_admin_reply: bool,
    ) -> Result<CommentRow, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO blog_comments (
                blog_id, author, email, phone, content, status, parent_id,
                is_admin_reply, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(blog_id)
        .bind(author)
        .bind(email)
        .bind(phone)
        .bind(content)
        .bind(status)
        .bind(parent_id)
        .bind(is_admin_reply as i32)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(CommentRow {
            id: result.last_insert_rowid(),
            blog_id,
            author: author.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            content: content.to_string(),
            status: status.to_string(),
            parent_id,
            is_admin_reply,
            created_at: now,
        })
    }

    pub async fn get_comment(&self, id: i64) -> Result<Option<CommentRow>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM blog_comments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    /// All comments, newest first (moderation queue).
    pub async fn list_comments(&self) -> Result<Vec<CommentRow>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM blog_comments ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    /// Comments for one blog, oldest first. `approved_only` gates public reads.
    pub async fn list_comments_for_blog(
        &self,
        blog_id: i64,
        approved_only: bool,
    ) -> Result<Vec<CommentRow>, AppError> {
        let sql = if approved_only {
            format!(
                "SELECT {COMMENT_COLUMNS} FROM blog_comments WHERE blog_id = ? AND status = 'approved' ORDER BY created_at ASC"
            )
        } else {
            format!(
                "SELECT {COMMENT_COLUMNS} FROM blog_comments WHERE blog_id = ? ORDER BY created_at ASC"
            )
        };

        let rows = sqlx::query(&sql).bind(blog_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    pub async fn set_comment_status(&self, id: i64, status: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE blog_comments SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a comment and its direct replies.
    pub async fn delete_comment_with_replies(&self, id: i64) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM blog_comments WHERE parent_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM blog_comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== REVIEW OPERATIONS ====================

    pub async fn insert_review(&self, review: &ReviewView) -> Result<(), AppError> {
        let review_images = serde_json::to_string(&review.review_images)?;
        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, name, designation, rating, comment, image_url, review_images,
                video_url, thumbnail_url, destination, review_type, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.name)
        .bind(&review.designation)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.image_url)
        .bind(&review_images)
        .bind(&review.video_url)
        .bind(&review.thumbnail_url)
        .bind(&review.destination)
        .bind(&review.review_type)
        .bind(&review.status)
        .bind(&review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_review(&self, id: &str) -> Result<Option<ReviewView>, AppError> {
        let row = sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    pub async fn list_reviews(&self) -> Result<Vec<ReviewView>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// Approved reviews of one type, newest first (public listings).
    pub async fn list_approved_reviews(
        &self,
        review_type: &str,
    ) -> Result<Vec<ReviewView>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE status = 'approved' AND review_type = ? ORDER BY created_at DESC"
        ))
        .bind(review_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    pub async fn set_review_status(&self, id: &str, status: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE reviews SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_review(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== TAXONOMY OPERATIONS ====================

    pub async fn list_taxonomy(
        &self,
        family: TaxonomyFamily,
    ) -> Result<Vec<TaxonomyEntry>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT id, name, slug, image FROM {} ORDER BY name",
            family.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(taxonomy_from_row).collect())
    }

    /// Exact name match, after trimming.
    pub async fn find_taxonomy_by_name(
        &self,
        family: TaxonomyFamily,
        name: &str,
    ) -> Result<Option<TaxonomyEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT id, name, slug, image FROM {} WHERE name = ?",
            family.table()
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(taxonomy_from_row))
    }

    pub async fn find_taxonomy_by_slug(
        &self,
        family: TaxonomyFamily,
        slug: &str,
    ) -> Result<Option<TaxonomyEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT id, name, slug, image FROM {} WHERE slug = ?",
            family.table()
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(taxonomy_from_row))
    }

    pub async fn taxonomy_slug_exists(
        &self,
        family: TaxonomyFamily,
        slug: &str,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM {} WHERE slug = ?",
            family.table()
        ))
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("n");
        Ok(count > 0)
    }

    pub async fn insert_taxonomy(
        &self,
        family: TaxonomyFamily,
        name: &str,
        slug: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, slug) VALUES (?, ?)",
            family.table()
        ))
        .bind(name.trim())
        .bind(slug)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_taxonomy_by_ids(
        &self,
        family: TaxonomyFamily,
        ids: &[i64],
    ) -> Result<Vec<TaxonomyEntry>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, slug, image FROM {} WHERE id IN ({placeholders})",
            family.table()
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(taxonomy_from_row).collect())
    }

    // ==================== IMAGE OPERATIONS ====================

    /// Register a stored image path and return its handle.
    pub async fn register_image(
        conn: &mut SqliteConnection,
        file_path: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO images (file_path) VALUES (?)")
            .bind(file_path)
            .execute(conn)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn image_path(&self, id: i64) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT file_path FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("file_path")))
    }

    /// Resolve a batch of image handles, preserving order and dropping
    /// dangling handles.
    pub async fn image_paths(&self, ids: &[i64]) -> Result<Vec<String>, AppError> {
        let mut paths = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(path) = self.image_path(*id).await? {
                paths.push(path);
            } else {
                tracing::warn!(image_id = id, "image handle dangling");
            }
        }
        Ok(paths)
    }
}

// ==================== SHARED QUERY HELPERS ====================

async fn slug_exists(
    pool: &SqlitePool,
    table: &str,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let row = match exclude_id {
        Some(id) => {
            sqlx::query(&format!(
                "SELECT COUNT(*) AS n FROM {table} WHERE slug = ? AND id != ?"
            ))
            .bind(slug)
            .bind(id)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table} WHERE slug = ?"))
                .bind(slug)
                .fetch_one(pool)
                .await?
        }
    };

    let count: i64 = row.get("n");
    Ok(count > 0)
}

async fn facet_exists(
    pool: &SqlitePool,
    table: &str,
    name: &str,
    from_location: &str,
    category: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let base = format!(
        "SELECT COUNT(*) AS n FROM {table} WHERE name = ? AND from_location = ? AND category = ?"
    );
    let row = match exclude_id {
        Some(id) => {
            sqlx::query(&format!("{base} AND id != ?"))
                .bind(name.trim())
                .bind(from_location.trim())
                .bind(category.trim())
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query(&base)
                .bind(name.trim())
                .bind(from_location.trim())
                .bind(category.trim())
                .fetch_one(pool)
                .await?
        }
    };

    let count: i64 = row.get("n");
    Ok(count > 0)
}

// ==================== ROW MAPPERS ====================

const PACKAGE_COLUMNS: &str = "id, title, slug, rating, max_group, customizable, marking, \
    overview, additional_info, status, images, created_at, updated_at, time_blob, \
    destinations_blob, seasons_blob, themes_blob, includes_blob, meta_blob, journey_blob, \
    itinerary_blob, inclusions_blob, exclusions_blob, price_blob, faq_blob";

const DESTINATION_COLUMNS: &str = "id, name, from_location, category, country, title, slug, \
    description, long_description, images, status, created_at, updated_at, meta_blob, \
    popular_packages_blob, main_packages_blob, faqs_blob";

const THEME_PAGE_COLUMNS: &str = "id, name, from_location, category, title, slug, description, \
    long_description, images, status, created_at, updated_at, meta_blob, \
    popular_destinations_blob, main_packages_blob, faqs_blob";

const BLOG_COLUMNS: &str = "id, title, slug, content, featured_image, category, tags, author, \
    meta, status, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, blog_id, author, email, phone, content, status, parent_id, \
    is_admin_reply, created_at";

const REVIEW_COLUMNS: &str = "id, name, designation, rating, comment, image_url, review_images, \
    video_url, thumbnail_url, destination, review_type, status, created_at";

fn package_from_row(row: &SqliteRow) -> PackageRow {
    PackageRow {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        rating: row.get("rating"),
        max_group: row.get("max_group"),
        customizable: row.get::<i32, _>("customizable") != 0,
        marking: row.get("marking"),
        overview: row.get("overview"),
        additional_info: row.get("additional_info"),
        status: row.get("status"),
        images: parse_id_list(row.get("images")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        time_blob: row.get("time_blob"),
        destinations_blob: row.get("destinations_blob"),
        seasons_blob: row.get("seasons_blob"),
        themes_blob: row.get("themes_blob"),
        includes_blob: row.get("includes_blob"),
        meta_blob: row.get("meta_blob"),
        journey_blob: row.get("journey_blob"),
        itinerary_blob: row.get("itinerary_blob"),
        inclusions_blob: row.get("inclusions_blob"),
        exclusions_blob: row.get("exclusions_blob"),
        price_blob: row.get("price_blob"),
        faq_blob: row.get("faq_blob"),
    }
}

fn destination_from_row(row: &SqliteRow) -> DestinationRow {
    DestinationRow {
        id: row.get("id"),
        name: row.get("name"),
        from_location: row.get("from_location"),
        category: row.get("category"),
        country: row.get("country"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        long_description: row.get("long_description"),
        images: parse_id_list(row.get("images")),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        meta_blob: row.get("meta_blob"),
        popular_packages_blob: row.get("popular_packages_blob"),
        main_packages_blob: row.get("main_packages_blob"),
        faqs_blob: row.get("faqs_blob"),
    }
}

fn theme_page_from_row(row: &SqliteRow) -> ThemePageRow {
    ThemePageRow {
        id: row.get("id"),
        name: row.get("name"),
        from_location: row.get("from_location"),
        category: row.get("category"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        long_description: row.get("long_description"),
        images: parse_id_list(row.get("images")),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        meta_blob: row.get("meta_blob"),
        popular_destinations_blob: row.get("popular_destinations_blob"),
        main_packages_blob: row.get("main_packages_blob"),
        faqs_blob: row.get("faqs_blob"),
    }
}

fn blog_from_row(row: &SqliteRow) -> BlogRow {
    let meta: MetaInfo = serde_json::from_str(row.get("meta")).unwrap_or_default();
    BlogRow {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        featured_image: row.get("featured_image"),
        category: parse_id_list(row.get("category")),
        tags: parse_id_list(row.get("tags")),
        author: row.get("author"),
        meta,
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn comment_from_row(row: &SqliteRow) -> CommentRow {
    CommentRow {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        author: row.get("author"),
        email: row.get("email"),
        phone: row.get("phone"),
        content: row.get("content"),
        status: row.get("status"),
        parent_id: row.get("parent_id"),
        is_admin_reply: row.get::<i32, _>("is_admin_reply") != 0,
        created_at: row.get("created_at"),
    }
}

fn review_from_row(row: &SqliteRow) -> ReviewView {
    let review_images: Vec<String> =
        serde_json::from_str(row.get("review_images")).unwrap_or_default();
    ReviewView {
        id: row.get("id"),
        name: row.get("name"),
        designation: row.get("designation"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        image_url: row.get("image_url"),
        review_images,
        video_url: row.get("video_url"),
        thumbnail_url: row.get("thumbnail_url"),
        destination: row.get("destination"),
        review_type: row.get("review_type"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

fn taxonomy_from_row(row: &SqliteRow) -> TaxonomyEntry {
    TaxonomyEntry {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        image: row.get("image"),
    }
}

/// Parse an embedded JSON id list, tolerating string-encoded ids. Garbled
/// text parses to an empty list.
fn parse_id_list(text: &str) -> Vec<i64> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text).unwrap_or_default();
    values
        .iter()
        .filter_map(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list_mixed() {
        assert_eq!(parse_id_list(r#"[1, "2", "x", null]"#), vec![1, 2]);
        assert_eq!(parse_id_list("not json"), Vec::<i64>::new());
        assert_eq!(parse_id_list("[]"), Vec::<i64>::new());
    }
}

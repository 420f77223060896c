//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth. Structured page content lives in the
//! shared `blobs` table; entity rows keep queryable scalars plus one blob
//! handle column per structured field.

mod blobs;
mod repository;

pub use blobs::*;
pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            rating REAL,
            max_group INTEGER,
            customizable INTEGER NOT NULL DEFAULT 0,
            marking TEXT,
            overview TEXT,
            additional_info TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            images TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            time_blob INTEGER,
            destinations_blob INTEGER,
            seasons_blob INTEGER,
            themes_blob INTEGER,
            includes_blob INTEGER,
            meta_blob INTEGER,
            journey_blob INTEGER,
            itinerary_blob INTEGER,
            inclusions_blob INTEGER,
            exclusions_blob INTEGER,
            price_blob INTEGER,
            faq_blob INTEGER
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS destinations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            from_location TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            country TEXT,
            title TEXT,
            slug TEXT NOT NULL,
            description TEXT,
            long_description TEXT,
            images TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            meta_blob INTEGER,
            popular_packages_blob INTEGER,
            main_packages_blob INTEGER,
            faqs_blob INTEGER
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS theme_pages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            from_location TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            title TEXT,
            slug TEXT NOT NULL,
            description TEXT,
            long_description TEXT,
            images TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            meta_blob INTEGER,
            popular_destinations_blob INTEGER,
            main_packages_blob INTEGER,
            faqs_blob INTEGER
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            content TEXT NOT NULL,
            featured_image INTEGER,
            category TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            author TEXT,
            meta TEXT NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            blog_id INTEGER NOT NULL,
            author TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            content TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            parent_id INTEGER,
            is_admin_reply INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            designation TEXT,
            rating INTEGER NOT NULL DEFAULT 5,
            comment TEXT,
            image_url TEXT,
            review_images TEXT NOT NULL DEFAULT '[]',
            video_url TEXT,
            thumbnail_url TEXT,
            destination TEXT,
            review_type TEXT NOT NULL DEFAULT 'text',
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Taxonomy tables share one shape
    for table in [
        "themes",
        "seasons",
        "countries",
        "includes",
        "blog_categories",
        "blog_tags",
    ] {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                image TEXT
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_slug ON {table}(slug);
            "#
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Unique indexes back the check-then-act pre-checks on slugs and facets
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_packages_slug ON packages(slug);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_destinations_slug ON destinations(slug);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_destinations_facet
            ON destinations(name, from_location, category);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_theme_pages_slug ON theme_pages(slug);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_theme_pages_facet
            ON theme_pages(name, from_location, category);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_blogs_slug ON blogs(slug);
        CREATE INDEX IF NOT EXISTS idx_blobs_kind ON blobs(kind);
        CREATE INDEX IF NOT EXISTS idx_comments_blog ON blog_comments(blog_id);
        CREATE INDEX IF NOT EXISTS idx_reviews_status ON reviews(status);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

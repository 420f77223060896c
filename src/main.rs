//! Travel CMS Backend
//!
//! REST backend for a travel agency content-management system: tour
//! packages, destination and theme pages, homepage curation, blog and
//! reviews, with SQLite persistence and composite page content stored as
//! typed JSON blobs.

mod api;
mod assembly;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod reconcile;
mod related;
mod taxonomy;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assembly::Assembler;
use config::Config;
use db::{BlobStore, Repository};
use reconcile::Reconciler;
use related::Resolver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub blobs: BlobStore,
    pub assembler: Assembler,
    pub reconciler: Reconciler,
    pub resolver: Resolver,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Travel CMS Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the admin key is not configured
    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (TOURCMS_ADMIN_KEY). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let state = build_state(pool, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the shared components over one pool.
pub fn build_state(pool: sqlx::SqlitePool, config: Config) -> AppState {
    let repo = Arc::new(Repository::new(pool.clone()));
    let blobs = BlobStore::new(pool);
    let resolver = Resolver::new(repo.clone(), blobs.clone());
    let assembler = Assembler::new(repo.clone(), blobs.clone(), resolver.clone());
    let reconciler = Reconciler::new(repo.clone(), blobs.clone());

    AppState {
        repo,
        blobs,
        assembler,
        reconciler,
        resolver,
        config: Arc::new(config),
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the admin key for the auth layer
    let admin_key = state.config.admin_key.clone();

    // Admin routes (admin key required)
    let admin_routes = Router::new()
        // Packages
        .route("/packages", get(api::list_packages).post(api::create_package))
        .route("/packages/check-slug", post(api::check_package_slug))
        .route(
            "/packages/{slug}",
            get(api::get_package)
                .put(api::update_package)
                .delete(api::delete_package),
        )
        // Destinations
        .route(
            "/destinations",
            get(api::list_destinations).post(api::create_destination),
        )
        .route(
            "/destinations/{slug}",
            get(api::get_destination)
                .put(api::update_destination)
                .delete(api::delete_destination),
        )
        // Theme pages
        .route(
            "/theme-pages",
            get(api::list_theme_pages).post(api::create_theme_page),
        )
        .route(
            "/theme-pages/{slug}",
            get(api::get_theme_page)
                .put(api::update_theme_page)
                .delete(api::delete_theme_page),
        )
        // Homepage
        .route("/homepage", get(api::get_homepage).put(api::save_homepage))
        // Blogs
        .route("/blogs", get(api::list_blogs).post(api::create_blog))
        .route(
            "/blogs/{id}",
            get(api::get_blog).put(api::update_blog).delete(api::delete_blog),
        )
        // Reviews moderation
        .route("/reviews", get(api::list_reviews))
        .route("/reviews/{id}/moderate", post(api::moderate_review))
        .route("/reviews/{id}", axum::routing::delete(api::delete_review))
        // Comments moderation
        .route("/comments", get(api::list_comments))
        .route("/comments/reply", post(api::admin_reply))
        .route("/comments/{id}/moderate", post(api::moderate_comment))
        .route("/comments/{id}", axum::routing::delete(api::delete_comment))
        // Taxonomy loaders for admin forms
        .route("/load/{family}", get(api::load_taxonomy))
        // Apply admin auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(admin_key.clone(), req, next)
        }));

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/public/packages/{slug}", get(api::get_public_package))
        .route("/public/destinations/{slug}", get(api::get_public_destination))
        .route("/destinations/{slug}/siblings", get(api::destination_siblings))
        .route("/public/theme-pages/{slug}", get(api::get_public_theme_page))
        .route("/theme-pages/{slug}/siblings", get(api::theme_page_siblings))
        .route("/related-packages", post(api::related_packages))
        .route("/public/homepage", get(api::get_public_homepage))
        .route("/public/blogs", get(api::list_public_blogs))
        .route("/public/blogs/{slug}", get(api::get_public_blog))
        .route("/public/blogs/{slug}/comments", get(api::list_public_comments))
        .route("/public/comments", post(api::create_comment))
        .route(
            "/public/reviews",
            get(api::list_public_reviews).post(api::create_review),
        )
        .route("/public/video-reviews", get(api::list_public_video_reviews));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", admin_routes.merge(public_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;

//! Integration tests for the travel CMS backend.

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::init_database;
use crate::{build_state, create_router};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_key(Some("test-admin-key".to_string())).await
    }

    async fn with_key(key: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            admin_key: key.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            request_timeout: std::time::Duration::from_secs(30),
        };

        let state = build_state(pool, config);
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = key {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-admin-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Create a published destination and return its id.
    async fn create_destination(&self, name: &str, from: &str, category: &str, slug: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/destinations",
                json!({
                    "name": name,
                    "from": from,
                    "category": category,
                    "country": "India",
                    "title": format!("{name} Holidays"),
                    "slug": slug,
                    "description": "Short description",
                    "longDescription": "A much longer description",
                    "metaTitle": format!("{name} trips"),
                    "metaTags": "travel, holidays",
                    "faqs": [{"question": "When to go?", "answer": "October to March"}],
                    "images": ["beach.jpg"],
                    "status": "published"
                }),
            )
            .await;
        assert_eq!(status, 200, "destination create failed: {body}");
        assert_eq!(body["data"]["status"], "published");
        body["data"]["id"].as_i64().unwrap()
    }

    /// Create a published package covering the given destination ids.
    async fn create_package(&self, title: &str, slug: &str, dest_ids: &[i64], days: i64) -> i64 {
        let (status, body) = self
            .post(
                "/api/packages",
                json!({
                    "title": title,
                    "slug": slug,
                    "days": days,
                    "nights": days - 1,
                    "destinations": dest_ids,
                    "themes": ["Beach"],
                    "seasons": ["Winter"],
                    "includes": ["Meals", "Hotel"],
                    "journey": [{"place": "Goa", "nights": days - 1}],
                    "itinerary": [
                        {"day": 1, "title": "Arrival", "description": "Check in"},
                        {"day": 2, "title": "Beach day", "description": "Relax"}
                    ],
                    "pricing": [{"price": 15000.0}],
                    "images": ["pkg.jpg"],
                    "status": "published"
                }),
            )
            .await;
        assert_eq!(status, 200, "package create failed: {body}");
        assert_eq!(body["data"]["status"], "published", "advisories: {}", body["data"]["advisories"]);
        body["data"]["id"].as_i64().unwrap()
    }
}

// ==================== HEALTH & AUTH ====================

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_routes_reject_missing_key() {
    let fixture = TestFixture::new().await;

    // A client without the default header
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/packages"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_admin_routes_reject_wrong_key() {
    let fixture = TestFixture::new().await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/packages"))
        .header("x-admin-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_public_routes_need_no_key() {
    let fixture = TestFixture::new().await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/public/blogs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

// ==================== PACKAGES ====================

#[tokio::test]
async fn test_package_create_without_images_downgrades_to_draft() {
    let fixture = TestFixture::new().await;
    let dest = fixture.create_destination("Goa", "", "", "goa").await;

    let (status, body) = fixture
        .post(
            "/api/packages",
            json!({
                "title": "Goa Getaway",
                "slug": "goa-getaway",
                "days": 4,
                "nights": 3,
                "destinations": [dest],
                "includes": ["Meals"],
                "journey": [{"place": "Goa", "nights": 3}],
                "itinerary": [
                    {"day": 1, "title": "Arrival", "description": ""},
                    {"day": 2, "title": "Beach", "description": ""}
                ],
                "images": [],
                "status": "published"
            }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");
    let advisories = body["data"]["advisories"].as_array().unwrap();
    assert!(
        advisories.iter().any(|a| a.as_str().unwrap().contains("image")),
        "expected an image advisory, got {advisories:?}"
    );

    // Draft packages are invisible on the public surface
    let (status, _) = fixture.get("/api/public/packages/goa-getaway").await;
    assert_eq!(status, 404);

    // Re-submit with one uploaded image: publish succeeds, no advisories
    let (status, body) = fixture
        .put(
            "/api/packages/goa-getaway",
            json!({ "images": ["goa.jpg"], "status": "published" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "published");
    assert!(body["data"]["advisories"].as_array().unwrap().is_empty());

    let (status, body) = fixture.get("/api/public/packages/goa-getaway").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["days"], 4);
    assert_eq!(body["data"]["destinations"][0], "Goa");
}

#[tokio::test]
async fn test_package_update_publish_without_images_is_rejected() {
    let fixture = TestFixture::new().await;
    let dest = fixture.create_destination("Goa", "", "", "goa").await;

    // Complete except for images, saved as draft
    let (status, body) = fixture
        .post(
            "/api/packages",
            json!({
                "title": "Imageless",
                "slug": "imageless",
                "destinations": [dest],
                "includes": ["Meals"],
                "journey": [{"place": "Goa", "nights": 2}],
                "itinerary": [{"day": 1, "title": "Arrival", "description": ""}],
                "status": "draft"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");

    // Explicit publish with zero retained and zero new images is a hard error
    let (status, body) = fixture
        .put("/api/packages/imageless", json!({ "status": "published" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // The same request as draft succeeds
    let (status, body) = fixture
        .put("/api/packages/imageless", json!({ "status": "draft" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn test_package_noop_update_reports_updated_false() {
    let fixture = TestFixture::new().await;
    let dest = fixture.create_destination("Goa", "", "", "goa").await;
    fixture.create_package("Goa Classic", "goa-classic", &[dest], 5).await;

    // Re-send a payload matching the stored state field for field
    let (status, body) = fixture
        .put(
            "/api/packages/goa-classic",
            json!({
                "title": "Goa Classic",
                "days": 5,
                "nights": 4,
                "destinations": [dest],
                "status": "published"
            }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["updated"], false);
    assert_eq!(body["data"]["status"], "published");
}

#[tokio::test]
async fn test_package_string_destination_ids_accepted() {
    let fixture = TestFixture::new().await;
    let dest = fixture.create_destination("Goa", "", "", "goa").await;

    let (status, body) = fixture
        .post(
            "/api/packages",
            json!({
                "title": "Mixed Ids",
                "slug": "mixed-ids",
                "destinations": [dest.to_string()],
                "includes": ["Meals"],
                "journey": [{"place": "Goa", "nights": 2}],
                "itinerary": [{"day": 1, "title": "Arrival", "description": ""}],
                "images": ["a.jpg"],
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "published");

    let (_, body) = fixture.get("/api/packages/mixed-ids").await;
    assert_eq!(body["data"]["destinations"][0], dest);
}

#[tokio::test]
async fn test_check_slug() {
    let fixture = TestFixture::new().await;
    let dest = fixture.create_destination("Goa", "", "", "goa").await;
    fixture.create_package("Goa Classic", "goa-classic", &[dest], 5).await;

    let (status, body) = fixture
        .post("/api/packages/check-slug", json!({ "slug": "goa-classic" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["suggestion"], "goa-classic-1");

    let (_, body) = fixture
        .post("/api/packages/check-slug", json!({ "slug": "something-new" }))
        .await;
    assert_eq!(body["data"]["available"], true);
}

// ==================== DESTINATIONS & FACETS ====================

#[tokio::test]
async fn test_facet_uniqueness_conflict() {
    let fixture = TestFixture::new().await;
    fixture.create_destination("Goa", "Delhi", "Beach", "goa-beach-from-delhi").await;

    let (status, body) = fixture
        .post(
            "/api/destinations",
            json!({
                "name": "Goa",
                "from": "Delhi",
                "category": "Beach",
                "slug": "goa-duplicate",
                "images": ["x.jpg"],
                "status": "draft"
            }),
        )
        .await;

    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_destination_publish_without_images_is_rejected() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/destinations",
            json!({
                "name": "Kerala",
                "slug": "kerala",
                "country": "India",
                "title": "Kerala",
                "description": "d",
                "longDescription": "ld",
                "metaTitle": "mt",
                "metaTags": "t",
                "faqs": [{"question": "q", "answer": "a"}],
                "images": [],
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Same payload as draft is accepted
    let (status, body) = fixture
        .post(
            "/api/destinations",
            json!({
                "name": "Kerala",
                "slug": "kerala",
                "country": "India",
                "images": [],
                "status": "draft"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn test_incomplete_destination_downgrades_with_advisories() {
    let fixture = TestFixture::new().await;

    // Has an image but no meta/faqs/descriptions: publish request downgrades
    let (status, body) = fixture
        .post(
            "/api/destinations",
            json!({
                "name": "Manali",
                "slug": "manali",
                "images": ["m.jpg"],
                "status": "published"
            }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");
    assert!(!body["data"]["advisories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_destination_siblings() {
    let fixture = TestFixture::new().await;
    let base = fixture.create_destination("Goa", "", "Beach", "goa-beach").await;
    fixture.create_destination("Goa", "Delhi", "Beach", "goa-beach-from-delhi").await;
    fixture.create_destination("Goa", "", "Honeymoon", "goa-honeymoon").await;
    fixture.create_destination("Kerala", "", "Beach", "kerala-beach").await;

    let (status, body) = fixture.get("/api/destinations/goa-beach/siblings").await;
    assert_eq!(status, 200);

    let from_siblings = body["data"]["fromSiblings"].as_array().unwrap();
    assert_eq!(from_siblings.len(), 1);
    assert_eq!(from_siblings[0]["from"], "Delhi");

    let category_siblings = body["data"]["categorySiblings"].as_array().unwrap();
    assert_eq!(category_siblings.len(), 1);
    assert_eq!(category_siblings[0]["category"], "Honeymoon");

    // The base page is never its own sibling
    assert!(from_siblings.iter().all(|s| s["id"] != base));
}

#[tokio::test]
async fn test_related_packages_by_destination_set_intersection() {
    let fixture = TestFixture::new().await;
    let goa = fixture.create_destination("Goa", "", "", "goa").await;
    let kerala = fixture.create_destination("Kerala", "", "", "kerala").await;

    fixture.create_package("Long Goa", "long-goa", &[goa], 9).await;
    fixture.create_package("Short Goa", "short-goa", &[goa, kerala], 3).await;
    fixture.create_package("Kerala Only", "kerala-only", &[kerala], 5).await;

    let (status, body) = fixture
        .post("/api/related-packages", json!({ "destinationName": "Goa" }))
        .await;
    assert_eq!(status, 200);

    let cards = body["data"].as_array().unwrap();
    let slugs: Vec<&str> = cards.iter().map(|c| c["slug"].as_str().unwrap()).collect();
    // Ascending trip length, Kerala-only excluded
    assert_eq!(slugs, vec!["short-goa", "long-goa"]);
}

#[tokio::test]
async fn test_public_destination_merges_curated_and_discovered() {
    let fixture = TestFixture::new().await;
    let goa = fixture.create_destination("Goa", "", "", "goa").await;

    let long = fixture.create_package("Long Goa", "long-goa", &[goa], 9).await;
    fixture.create_package("Short Goa", "short-goa", &[goa], 3).await;

    // Curate the long package as a main package; the short one is discovered
    let (status, _) = fixture
        .put("/api/destinations/goa", json!({ "mainPackages": [long] }))
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture.get("/api/public/destinations/goa").await;
    assert_eq!(status, 200);

    let packages = body["data"]["packages"].as_array().unwrap();
    let slugs: Vec<&str> = packages.iter().map(|p| p["slug"].as_str().unwrap()).collect();
    // Curated first, then discovered; the curated entry is not repeated
    assert_eq!(slugs, vec!["long-goa", "short-goa"]);
}

#[tokio::test]
async fn test_draft_destination_not_public() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/destinations",
            json!({ "name": "Hidden", "slug": "hidden", "images": ["h.jpg"], "status": "draft" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");

    let (status, _) = fixture.get("/api/public/destinations/hidden").await;
    assert_eq!(status, 404);

    // Still visible through the admin surface
    let (status, _) = fixture.get("/api/destinations/hidden").await;
    assert_eq!(status, 200);
}

// ==================== THEME PAGES ====================

#[tokio::test]
async fn test_theme_page_public_destination_cards() {
    let fixture = TestFixture::new().await;
    let goa = fixture.create_destination("Goa", "", "", "goa").await;
    fixture.create_package("Goa Beach Trip", "goa-beach-trip", &[goa], 4).await;

    let (status, body) = fixture
        .post(
            "/api/theme-pages",
            json!({
                "name": "Beach Holidays",
                "category": "Beach",
                "slug": "beach-holidays",
                "title": "Beach Holidays",
                "description": "d",
                "longDescription": "ld",
                "metaTitle": "mt",
                "metaTags": "t",
                "popularDestinations": ["Goa"],
                "mainPackages": [1],
                "faqs": [{"question": "q", "answer": "a"}],
                "images": ["t.jpg"],
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 200, "theme page create failed: {body}");
    assert_eq!(body["data"]["status"], "published");

    let (status, body) = fixture.get("/api/public/theme-pages/beach-holidays").await;
    assert_eq!(status, 200);

    let cards = body["data"]["popularDestinations"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["name"], "Goa");
    assert_eq!(cards[0]["slug"], "goa");
    // The Goa package carries the Beach theme, so the count includes it
    assert_eq!(cards[0]["count"], 1);
}

// ==================== HOMEPAGE ====================

#[tokio::test]
async fn test_homepage_save_and_public_enrichment() {
    let fixture = TestFixture::new().await;
    let goa = fixture.create_destination("Goa", "", "", "goa").await;
    let pkg = fixture.create_package("Goa Classic", "goa-classic", &[goa], 5).await;

    let content = json!({
        "banners": [{"image": "banner.jpg", "title": "Sale", "subtitle": "", "link": "/sale"}],
        "popularDestinations": ["Goa", "Atlantis"],
        "popularPackages": [pkg, 9999],
        "themeSections": [],
        "seasons": ["Winter"],
        "domestic": ["Goa"],
        "international": [],
        "reviewIds": [],
        "blogIds": []
    });

    let (status, body) = fixture.put("/api/homepage", content.clone()).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["updated"], true);

    // Saving identical content again is a no-op
    let (status, body) = fixture.put("/api/homepage", content).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["updated"], false);

    let (status, body) = fixture.get("/api/public/homepage").await;
    assert_eq!(status, 200);

    // Dangling references are dropped from every section
    let destinations = body["data"]["popularDestinations"].as_array().unwrap();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0]["name"], "Goa");

    let packages = body["data"]["popularPackages"].as_array().unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0]["slug"], "goa-classic");

    assert_eq!(body["data"]["banners"][0]["image"], "banner.jpg");
}

// ==================== BLOGS & TAXONOMY ====================

#[tokio::test]
async fn test_blog_taxonomy_find_or_create_idempotent() {
    let fixture = TestFixture::new().await;

    let (status, _) = fixture
        .post(
            "/api/blogs",
            json!({
                "title": "First Post",
                "slug": "first-post",
                "content": "hello",
                "category": ["Travel Tips"],
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = fixture
        .post(
            "/api/blogs",
            json!({
                "title": "Second Post",
                "slug": "second-post",
                "content": "world",
                "category": ["Travel Tips"],
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 200);

    // Exactly one taxonomy row for the repeated name
    let (status, body) = fixture.get("/api/load/blog-categories").await;
    assert_eq!(status, 200);
    let rows = body["data"].as_array().unwrap();
    let matching: Vec<&Value> = rows.iter().filter(|r| r["name"] == "Travel Tips").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["slug"], "travel-tips");

    // Both blogs resolve the category to the same display name
    let (_, body) = fixture.get("/api/public/blogs").await;
    let blogs = body["data"].as_array().unwrap();
    assert_eq!(blogs.len(), 2);
    for blog in blogs {
        assert_eq!(blog["category"][0], "Travel Tips");
    }
}

#[tokio::test]
async fn test_blog_requires_title_and_content() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/blogs", json!({ "title": "No content" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_draft_blog_not_in_public_listing() {
    let fixture = TestFixture::new().await;

    fixture
        .post(
            "/api/blogs",
            json!({ "title": "Draft", "slug": "draft-post", "content": "x", "status": "draft" }),
        )
        .await;

    let (_, body) = fixture.get("/api/public/blogs").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = fixture.get("/api/public/blogs/draft-post").await;
    assert_eq!(status, 404);
}

// ==================== COMMENTS ====================

#[tokio::test]
async fn test_comment_moderation_gates_public_visibility() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post(
            "/api/blogs",
            json!({ "title": "Post", "slug": "post", "content": "x", "status": "published" }),
        )
        .await;
    let blog_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = fixture
        .post(
            "/api/public/comments",
            json!({ "blogId": blog_id, "author": "Asha", "content": "Nice trip!" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending");
    let comment_id = body["data"]["id"].as_i64().unwrap();

    // Pending comments are not public
    let (_, body) = fixture
        .get(&format!("/api/public/blogs/{blog_id}/comments"))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Approve and it appears
    let (status, _) = fixture
        .post(
            &format!("/api/comments/{comment_id}/moderate"),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = fixture
        .get(&format!("/api/public/blogs/{blog_id}/comments"))
        .await;
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["author"], "Asha");
}

#[tokio::test]
async fn test_admin_reply_is_auto_approved() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post(
            "/api/blogs",
            json!({ "title": "Post", "slug": "post", "content": "x", "status": "published" }),
        )
        .await;
    let blog_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = fixture
        .post(
            "/api/public/comments",
            json!({ "blogId": blog_id, "author": "Asha", "content": "Question?" }),
        )
        .await;
    let comment_id = body["data"]["id"].as_i64().unwrap();
    fixture
        .post(
            &format!("/api/comments/{comment_id}/moderate"),
            json!({ "status": "approved" }),
        )
        .await;

    let (status, body) = fixture
        .post(
            "/api/comments/reply",
            json!({ "blogId": blog_id, "parentId": comment_id, "content": "Answer." }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["isAdminReply"], true);

    let (_, body) = fixture
        .get(&format!("/api/public/blogs/{blog_id}/comments"))
        .await;
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 1);
}

// ==================== REVIEWS ====================

#[tokio::test]
async fn test_review_moderation_flow() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/public/reviews",
            json!({
                "name": "Ravi",
                "rating": 5,
                "comment": "Wonderful trip",
                "destination": "Goa"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending");
    let review_id = body["data"]["id"].as_str().unwrap().to_string();

    // Pending reviews are not public
    let (_, body) = fixture.get("/api/public/reviews").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = fixture
        .post(
            &format!("/api/reviews/{review_id}/moderate"),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = fixture.get("/api/public/reviews").await;
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["name"], "Ravi");
}

#[tokio::test]
async fn test_video_review_requires_url_and_lists_separately() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/public/reviews",
            json!({ "name": "Meera", "rating": 4, "reviewType": "video" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture
        .post(
            "/api/public/reviews",
            json!({
                "name": "Meera",
                "rating": 4,
                "reviewType": "video",
                "videoUrl": "https://example.com/v.mp4"
            }),
        )
        .await;
    assert_eq!(status, 200);
    let review_id = body["data"]["id"].as_str().unwrap().to_string();
    fixture
        .post(
            &format!("/api/reviews/{review_id}/moderate"),
            json!({ "status": "approved" }),
        )
        .await;

    let (_, body) = fixture.get("/api/public/video-reviews").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    // Video reviews do not leak into the text listing
    let (_, body) = fixture.get("/api/public/reviews").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// ==================== DELETES ====================

#[tokio::test]
async fn test_delete_package_removes_it() {
    let fixture = TestFixture::new().await;
    let goa = fixture.create_destination("Goa", "", "", "goa").await;
    let pkg = fixture.create_package("Gone Soon", "gone-soon", &[goa], 4).await;

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/packages/{pkg}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = fixture.get("/api/packages/gone-soon").await;
    assert_eq!(status, 404);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/packages/{pkg}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

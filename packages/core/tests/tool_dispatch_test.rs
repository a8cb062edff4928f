//! End-to-end tool dispatch over the in-memory collaborators
//!
//! Drives `Dispatcher::call` the way a session does and inspects both the
//! returned envelope and the calls that reached the document store.

mod common;

use common::{contains_any_key, CountingStore, TestGateway, ARTICLE, AUTHOR};
use content_mcp_core::db::DocumentStore;
use content_mcp_core::utils::{CONTENT_OMITTED_NOTE, LARGE_CONTENT_FIELDS};
use serde_json::json;

async fn seed_two_articles(gateway: &TestGateway) {
    gateway
        .seed_article(json!({
            "title": "First",
            "views": 10,
            "content": "# Long markdown body",
            "body": [{ "type": "paragraph", "children": [] }],
            "internalNotes": "editor only",
            "seo": { "metaTitle": "First SEO", "markdown": "**seo copy**" },
            "sections": [
                { "__component": "blocks.hero", "heading": "Welcome", "html": "<h1>Welcome</h1>" }
            ]
        }))
        .await;
    gateway
        .seed_article(json!({
            "title": "Second",
            "views": 20,
            "content": "Another body"
        }))
        .await;
}

// ============================================================================
// Routing and validation
// ============================================================================

#[tokio::test]
async fn test_unknown_tool_never_reaches_the_store() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway.call("drop_database", json!({ "uid": ARTICLE })).await;

    assert!(is_error);
    assert_eq!(body["error"], true);
    assert_eq!(body["tool"], "drop_database");
    assert_eq!(body["message"], "Unknown tool: drop_database");
    assert!(gateway.store.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_store() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("find_many", json!({ "status": "archived", "pagination": { "page": 0 } }))
        .await;

    assert!(is_error);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Validation failed for find_many:"));
    assert!(message.contains("uid: Required"));
    assert!(message.contains("Invalid enum value. Expected 'draft' | 'published', received 'archived'"));
    assert!(message.contains("pagination.page: Number must be greater than or equal to 1"));
    assert!(gateway.store.calls().is_empty());
}

#[tokio::test]
async fn test_non_user_content_types_are_not_found_before_any_store_call() {
    let gateway = TestGateway::new();

    for uid in ["plugin::users-permissions.user", "api::missing.missing", "does-not-exist"] {
        let (body, is_error) = gateway.call("find_many", json!({ "uid": uid })).await;

        assert!(is_error);
        assert_eq!(
            body["message"],
            format!(
                "Content type \"{}\" not found. Use list_content_types to see available content types.",
                uid
            )
        );
    }

    let (_, is_error) = gateway
        .call("create", json!({ "uid": "plugin::users-permissions.user", "data": { "username": "x" } }))
        .await;
    assert!(is_error);

    assert!(gateway.store.calls().is_empty());
}

// ============================================================================
// Catalog tools
// ============================================================================

#[tokio::test]
async fn test_list_content_types_only_returns_user_types() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway.call("list_content_types", json!({})).await;

    assert!(!is_error);
    assert_eq!(body["count"], 3);
    let uids: Vec<&str> = body["contentTypes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|ct| ct["uid"].as_str().unwrap())
        .collect();
    assert!(uids.contains(&ARTICLE));
    assert!(uids.contains(&"api::homepage.homepage"));
    assert!(!uids.iter().any(|uid| uid.starts_with("plugin::")));
    assert!(body["usage"]["tip"].is_string());
}

#[tokio::test]
async fn test_list_components_pages_and_filters() {
    let gateway = TestGateway::new();

    let (body, _) = gateway
        .call("list_components", json!({ "page": 1, "pageSize": 2 }))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pageCount"], 2);
    assert_eq!(body["categories"], json!(["blocks", "shared"]));

    let (body, _) = gateway
        .call("list_components", json!({ "category": "blocks" }))
        .await;
    assert_eq!(body["category"], "blocks");
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["pageSize"], 25);
}

#[tokio::test]
async fn test_list_components_page_past_the_end_is_empty() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("list_components", json!({ "page": 9, "pageSize": 2 }))
        .await;

    assert!(!is_error);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["page"], 9);
    assert_eq!(body["pagination"]["pageCount"], 2);
}

#[tokio::test]
async fn test_list_components_page_beyond_integer_range_is_empty() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("list_components", json!({ "page": 5_000_000_000u64, "pageSize": 2 }))
        .await;

    assert!(!is_error, "{body}");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["page"], u32::MAX);
    assert_eq!(body["pagination"]["pageCount"], 2);
}

// ============================================================================
// find_many projection
// ============================================================================

#[tokio::test]
async fn test_find_many_strips_large_fields_at_every_depth() {
    let gateway = TestGateway::new();
    seed_two_articles(&gateway).await;

    let (body, is_error) = gateway.call("find_many", json!({ "uid": ARTICLE })).await;

    assert!(!is_error);
    assert_eq!(body["count"], 2);
    assert_eq!(body["uid"], ARTICLE);
    assert_eq!(body["note"], CONTENT_OMITTED_NOTE);
    assert!(!contains_any_key(&body["data"], LARGE_CONTENT_FIELDS));

    let first = &body["data"][0];
    assert_eq!(first["title"], "First");
    assert_eq!(first["seo"]["metaTitle"], "First SEO");
    assert_eq!(first["sections"][0]["heading"], "Welcome");
    assert!(first.get("internalNotes").is_none());
}

#[tokio::test]
async fn test_find_many_include_content_keeps_everything_readable() {
    let gateway = TestGateway::new();
    seed_two_articles(&gateway).await;

    let (body, _) = gateway
        .call("find_many", json!({ "uid": ARTICLE, "includeContent": true }))
        .await;

    assert!(body.get("note").is_none());
    assert_eq!(body["data"][0]["content"], "# Long markdown body");
    assert_eq!(body["data"][0]["seo"]["markdown"], "**seo copy**");
    assert!(body["data"][0].get("internalNotes").is_none());
}

#[tokio::test]
async fn test_find_many_explicit_fields_disable_stripping() {
    let gateway = TestGateway::new();
    seed_two_articles(&gateway).await;

    let (body, _) = gateway
        .call("find_many", json!({ "uid": ARTICLE, "fields": ["title", "content"] }))
        .await;

    assert!(body.get("note").is_none());
    assert_eq!(body["data"][1]["content"], "Another body");
    assert!(body["data"][1].get("views").is_none());
}

#[tokio::test]
async fn test_find_many_page_mode_wins_over_offset_mode() {
    let gateway = TestGateway::new();
    seed_two_articles(&gateway).await;

    let (body, _) = gateway
        .call(
            "find_many",
            json!({
                "uid": ARTICLE,
                "sort": "views:desc",
                "pagination": { "page": 1, "pageSize": 1, "start": 1, "limit": 5 }
            }),
        )
        .await;

    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Second");

    let (body, _) = gateway
        .call(
            "find_many",
            json!({ "uid": ARTICLE, "sort": ["views:desc"], "pagination": { "start": 1 } }),
        )
        .await;

    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "First");
}

#[tokio::test]
async fn test_find_many_filters_on_private_fields_are_dropped() {
    let gateway = TestGateway::new();
    seed_two_articles(&gateway).await;

    let (body, _) = gateway
        .call(
            "find_many",
            json!({ "uid": ARTICLE, "filters": { "internalNotes": { "$eq": "editor only" } } }),
        )
        .await;

    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_find_many_null_condition_on_relation_reaches_the_store() {
    let gateway = TestGateway::new();
    gateway
        .seed_article(json!({ "title": "Attributed", "author": 7 }))
        .await;
    gateway.seed_article(json!({ "title": "Anonymous" })).await;

    let (body, is_error) = gateway
        .call(
            "find_many",
            json!({ "uid": ARTICLE, "filters": { "author": { "$null": true } } }),
        )
        .await;

    assert!(!is_error);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Anonymous");

    let (body, _) = gateway
        .call(
            "find_many",
            json!({ "uid": ARTICLE, "filters": { "author": { "$notNull": true } } }),
        )
        .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Attributed");
}

#[tokio::test]
async fn test_unsanitizable_store_output_is_withheld() {
    let gateway = TestGateway::with_store(CountingStore::corrupting());

    let (body, is_error) = gateway.call("find_many", json!({ "uid": ARTICLE })).await;

    assert!(is_error);
    assert_eq!(
        body["message"],
        "Failed to sanitize output for \"api::article.article\". Data not returned for security."
    );
    assert!(body.get("data").is_none());
}

// ============================================================================
// Single-document tools
// ============================================================================

#[tokio::test]
async fn test_find_one_missing_document_returns_marker() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("find_one", json!({ "uid": ARTICLE, "documentId": "nope" }))
        .await;

    assert!(!is_error);
    assert_eq!(
        body,
        json!({ "error": "Document not found", "uid": ARTICLE, "documentId": "nope" })
    );
}

#[tokio::test]
async fn test_create_then_find_one_returns_written_fields() {
    let gateway = TestGateway::new();

    let (created, is_error) = gateway
        .call(
            "create",
            json!({
                "uid": AUTHOR,
                "data": { "name": "Ada", "email": "ada@example.com", "password": "secret", "unknown": 1 },
                "status": "published"
            }),
        )
        .await;

    assert!(!is_error);
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Document created successfully");
    let document_id = created["data"]["documentId"].as_str().unwrap().to_string();
    assert!(created["data"].get("email").is_none());
    assert!(created["data"].get("password").is_none());

    let (found, _) = gateway
        .call("find_one", json!({ "uid": AUTHOR, "documentId": document_id }))
        .await;

    assert_eq!(found["data"]["name"], "Ada");
    assert_eq!(found["documentId"], document_id.as_str());
    assert!(found["data"]["publishedAt"].is_string());

    let stored = gateway
        .store
        .inner()
        .find_one(AUTHOR, &document_id, Default::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["email"], "ada@example.com");
    assert!(stored.get("unknown").is_none());
}

#[tokio::test]
async fn test_update_of_missing_document_is_not_found_without_mutation() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call(
            "update",
            json!({ "uid": ARTICLE, "documentId": "ghost", "data": { "title": "x" } }),
        )
        .await;

    assert!(is_error);
    assert_eq!(
        body["message"],
        "Document with id \"ghost\" not found in \"api::article.article\"."
    );
    assert_eq!(gateway.store.mutations(), 0);
}

#[tokio::test]
async fn test_delete_of_missing_document_is_not_found_without_mutation() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("delete", json!({ "uid": ARTICLE, "documentId": "ghost" }))
        .await;

    assert!(is_error);
    assert_eq!(body["tool"], "delete");
    assert_eq!(gateway.store.mutations(), 0);
}

#[tokio::test]
async fn test_update_and_delete_existing_document() {
    let gateway = TestGateway::new();
    let seeded = gateway
        .seed_article(json!({ "title": "Draft", "internalNotes": "keep" }))
        .await;
    let document_id = seeded["documentId"].as_str().unwrap();

    let (updated, is_error) = gateway
        .call(
            "update",
            json!({
                "uid": ARTICLE,
                "documentId": document_id,
                "data": { "title": "Final", "internalNotes": "reviewed" }
            }),
        )
        .await;

    assert!(!is_error);
    assert_eq!(updated["data"]["title"], "Final");
    assert_eq!(updated["message"], "Document updated successfully");

    let stored = gateway
        .store
        .inner()
        .find_one(ARTICLE, document_id, Default::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["internalNotes"], "reviewed");
    assert!(updated["data"].get("internalNotes").is_none());

    let (deleted, is_error) = gateway
        .call("delete", json!({ "uid": ARTICLE, "documentId": document_id }))
        .await;

    assert!(!is_error);
    assert_eq!(deleted["data"]["documentId"], document_id);
    assert_eq!(deleted["data"]["entries"].as_array().unwrap().len(), 1);
    assert!(deleted["data"]["entries"][0].get("internalNotes").is_none());

    let (found, _) = gateway
        .call("find_one", json!({ "uid": ARTICLE, "documentId": document_id }))
        .await;
    assert_eq!(found["error"], "Document not found");
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_upload_media_rejects_bad_urls_before_fetching() {
    let gateway = TestGateway::new();

    let (body, is_error) = gateway
        .call("upload_media", json!({ "url": "not a url" }))
        .await;

    assert!(is_error);
    assert!(body["message"].as_str().unwrap().contains("url: Must be a valid URL"));
    assert!(gateway.uploads.is_empty().await);
}

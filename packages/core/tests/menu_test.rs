//! Integration tests for menu assembly through ContentService
//!
//! Tests cover:
//! - Root and child placement with orphan promotion
//! - Sibling ordering with order collisions
//! - Orphans left behind by a cascading delete
//! - Very deep parent chains
//! - JSON shape of the assembled tree

use contentspace_core::db::{DatabaseService, LibsqlStore, MemoryStore};
use contentspace_core::services::seed_defaults;
use contentspace_core::{ContentNode, ContentService, NodeUpdate, TreeNode};
use std::sync::Arc;
use tempfile::TempDir;

fn keys(trees: &[TreeNode]) -> Vec<&str> {
    trees.iter().map(TreeNode::key).collect()
}

async fn libsql_service() -> (ContentService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(
        DatabaseService::new(temp_dir.path().join("menu.db"))
            .await
            .unwrap(),
    );
    (
        ContentService::new(Arc::new(LibsqlStore::new(db))),
        temp_dir,
    )
}

// =========================================================================
// Menu Scenarios
// =========================================================================

async fn assert_root_child_orphan_menu(service: &ContentService) {
    service.create("root1", "Root", None).await.unwrap();
    service
        .create("child1", "Child", Some("root1".to_string()))
        .await
        .unwrap();
    service
        .create("orphan1", "Orphan", Some("missing".to_string()))
        .await
        .unwrap();

    let menu = service.menu().await.unwrap();

    assert_eq!(keys(&menu), vec!["root1", "orphan1"]);
    assert_eq!(keys(&menu[0].children), vec!["child1"]);
    assert!(menu[1].children.is_empty());
}

#[tokio::test]
async fn test_menu_with_orphan_memory() {
    let service = ContentService::new(Arc::new(MemoryStore::new()));
    assert_root_child_orphan_menu(&service).await;
}

#[tokio::test]
async fn test_menu_with_orphan_libsql() {
    let (service, _temp) = libsql_service().await;
    assert_root_child_orphan_menu(&service).await;
}

#[tokio::test]
async fn test_menu_after_delete_promotes_grandchildren() {
    let (service, _temp) = libsql_service().await;
    service.create("a", "", None).await.unwrap();
    service.create("b", "", Some("a".to_string())).await.unwrap();
    service.create("c", "", Some("b".to_string())).await.unwrap();
    service.create("d", "", Some("c".to_string())).await.unwrap();

    service.delete("a").await.unwrap();
    let menu = service.menu().await.unwrap();

    assert_eq!(keys(&menu), vec!["c"]);
    assert_eq!(keys(&menu[0].children), vec!["d"]);
}

#[tokio::test]
async fn test_menu_orders_colliding_siblings_by_last_touch() {
    let service = ContentService::new(Arc::new(MemoryStore::new()));
    service.create("first", "", None).await.unwrap();
    service.create("second", "", None).await.unwrap();

    // Move "first" onto the same order as "second"; it was touched last
    service
        .update("first", NodeUpdate::new().with_order(1))
        .await
        .unwrap();

    let menu = service.menu().await.unwrap();
    assert_eq!(keys(&menu), vec!["second", "first"]);
}

#[tokio::test]
async fn test_menu_breaks_stored_cycle() {
    let store = Arc::new(MemoryStore::with_nodes(vec![
        ContentNode::new("a", "", Some("b".to_string()), 0),
        ContentNode::new("b", "", Some("a".to_string()), 0),
    ]));
    let service = ContentService::new(store);

    let menu = service.menu().await.unwrap();

    let total: usize = menu.iter().map(TreeNode::subtree_len).sum();
    assert_eq!(total, 2);
    assert_eq!(menu.len(), 1);
}

#[tokio::test]
async fn test_menu_on_deep_chain() {
    let depth = 100_000;
    let chain = (0..depth).map(|i| {
        let parent = if i == 0 { None } else { Some(format!("n{}", i - 1)) };
        ContentNode::new(format!("n{}", i), "", parent, 0)
    });
    let service = ContentService::new(Arc::new(MemoryStore::with_nodes(chain)));

    // The ancestor walk stops at its bound, so the append is accepted
    service
        .create("tail", "", Some(format!("n{}", depth - 1)))
        .await
        .unwrap();

    let menu = service.menu().await.unwrap();

    assert_eq!(keys(&menu), vec!["n0"]);
    assert_eq!(menu[0].depth(), depth + 1);
    assert_eq!(menu[0].subtree_len(), depth + 1);
}

#[tokio::test]
async fn test_seeded_store_menu() {
    let (service, _temp) = libsql_service().await;
    seed_defaults(&service).await.unwrap();

    let menu = service.menu().await.unwrap();
    let mut roots = keys(&menu);
    roots.sort();

    assert_eq!(roots, vec!["home", "sobre"]);
}

// =========================================================================
// Serialization
// =========================================================================

#[tokio::test]
async fn test_menu_json_shape() {
    let service = ContentService::new(Arc::new(MemoryStore::new()));
    service.create("home", "Welcome", None).await.unwrap();
    service
        .create("intro", "Hello", Some("home".to_string()))
        .await
        .unwrap();

    let menu = service.menu().await.unwrap();
    let json = serde_json::to_value(&menu).unwrap();

    let root = &json[0];
    assert_eq!(root["key"], "home");
    assert_eq!(root["value"], "Welcome");
    assert!(root["parentKey"].is_null());
    assert_eq!(root["order"], 0);
    assert!(root["createdAt"].is_string());
    assert!(root["updatedAt"].is_string());

    let child = &root["children"][0];
    assert_eq!(child["key"], "intro");
    assert_eq!(child["parentKey"], "home");
    assert_eq!(child["children"].as_array().unwrap().len(), 0);
}

// FICHIER : docstash/tests/storage_suite/collection_policy.rs

use crate::init_test_env;
use docstash::storage::remote::{CollectionKind, CreateCollectionOptions};
use docstash::storage::{
    CollectionPolicy, CollectionState, DocumentStore, SaveOptions, StorageSystem, WithCollections,
};
use docstash::utils::prelude::*;

async fn auto_creates(store: &dyn DocumentStore) {
    assert_eq!(store.collection_policy(), CollectionPolicy::AutoCreate);
    assert!(store.get_collections().await.unwrap().is_empty());

    store
        .save(json!({ "_collection": "implicit", "v": 1 }), SaveOptions::new())
        .await
        .unwrap();

    assert_eq!(store.get_collections().await.unwrap(), vec!["implicit".to_string()]);
    assert_eq!(
        store.ensure_collection("implicit").await.unwrap(),
        CollectionState::Existing(1)
    );
}

#[tokio::test]
async fn memory_store_auto_creates_collections() {
    let env = init_test_env().await;
    auto_creates(&env.memory).await;
}

#[tokio::test]
async fn file_store_auto_creates_collections() {
    let env = init_test_env().await;
    auto_creates(&env.file).await;
    assert!(env.data_root.join("implicit").is_dir());
}

#[tokio::test]
async fn remote_store_requires_existing_collections() {
    let env = init_test_env().await;
    let store = &env.remote;
    assert_eq!(store.collection_policy(), CollectionPolicy::RequireExisting);

    let res = store
        .save(json!({ "_collection": "implicit", "v": 1 }), SaveOptions::new())
        .await;
    assert!(matches!(res, Err(StoreError::CollectionNotFound(ref c)) if c == "implicit"));
    assert!(store.get_collections().await.unwrap().is_empty());

    store
        .ensure_collection_with("edges", &CreateCollectionOptions::edge())
        .await
        .unwrap();
    assert_eq!(store.driver().kind_of("edges").await, Some(CollectionKind::Edge));
    store
        .save(json!({ "_collection": "edges", "v": 1 }), SaveOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn collection_names_are_validated() {
    let env = init_test_env().await;
    for store in [&env.memory as &dyn DocumentStore, &env.file, &env.remote] {
        for bad in ["", "a/b"] {
            let res = store.ensure_collection(bad).await;
            assert!(matches!(res, Err(StoreError::InvalidSelector(_))), "'{}'", bad);
        }
    }
}

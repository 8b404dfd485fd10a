// FICHIER : docstash/tests/storage_suite/contract.rs

//! Comportements communs exigés de chaque backend.

use crate::init_test_env;
use docstash::storage::{
    CollectionState, DocumentStore, OverwriteMode, SaveOptions, StorageSystem, WithCollections,
    WithQueries,
};
use docstash::utils::prelude::*;

async fn save_fetch_round_trip(store: &dyn DocumentStore) {
    store.ensure_collection("people").await.unwrap();

    let id = store
        .save(
            json!({ "_collection": "people", "name": "Ada", "meta": { "tags": ["x"] } }),
            SaveOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(id.collection, "people");
    assert_eq!(id.id, format!("people/{}", id.key));

    let doc = store.fetch((&id).into()).await.unwrap().expect("document attendu");
    assert_eq!(
        Value::Object(doc.clone()),
        json!({
            "name": "Ada",
            "meta": { "tags": ["x"] },
            "_collection": "people",
            "_key": id.key.as_str(),
            "_id": id.id.as_str(),
        })
    );

    // L'identité relue depuis le document est la même.
    let again = store.resolve((&doc).into()).unwrap();
    assert_eq!(again, id);
}

async fn numeric_key_is_kept(store: &dyn DocumentStore) {
    store.ensure_collection("people").await.unwrap();
    let id = store
        .save(json!({ "_collection": "people", "_key": 5 }), SaveOptions::new())
        .await
        .unwrap();
    assert_eq!(id.id, "people/5");
    assert!(store.has("people/5".into()).await.unwrap());
    let doc = store.fetch("people/5".into()).await.unwrap().unwrap();
    assert_eq!(doc["_key"], "5");
}

async fn delete_is_true_once(store: &dyn DocumentStore) {
    store.ensure_collection("people").await.unwrap();
    store
        .save(json!({ "_id": "people/bob" }), SaveOptions::new())
        .await
        .unwrap();

    assert!(store.has("people/bob".into()).await.unwrap());
    assert!(store.delete("people/bob".into()).await.unwrap());
    assert!(!store.delete("people/bob".into()).await.unwrap());
    assert!(!store.has("people/bob".into()).await.unwrap());
    assert!(store.fetch("people/bob".into()).await.unwrap().is_none());
}

async fn ensure_twice_keeps_contents(store: &dyn DocumentStore) {
    assert_eq!(store.ensure_collection("c").await.unwrap(), CollectionState::Created);
    store
        .save_all(
            vec![json!({ "_id": "c/1" }), json!({ "_id": "c/2" })],
            SaveOptions::new(),
        )
        .await
        .unwrap();

    let second = store.ensure_collection("c").await.unwrap();
    assert_eq!(second, CollectionState::Existing(2));
    assert_eq!(second.as_count(), 2);
    assert!(store.has("c/1".into()).await.unwrap());
}

async fn empty_collection_sentinel(store: &dyn DocumentStore) {
    assert_eq!(store.empty_collection("absent").await.unwrap(), None);

    store.ensure_collection("full").await.unwrap();
    for i in 0..5 {
        store
            .save(json!({ "_collection": "full", "i": i }), SaveOptions::new())
            .await
            .unwrap();
    }
    assert_eq!(store.empty_collection("full").await.unwrap(), Some(5));
    assert!(store
        .get_collections()
        .await
        .unwrap()
        .contains(&"full".to_string()));
    assert!(store.fetch_all("full", None).await.unwrap().is_empty());

    assert!(store.destroy_collection("full").await.unwrap());
    assert!(!store.destroy_collection("full").await.unwrap());
}

async fn overwrite_modes(store: &dyn DocumentStore) {
    store.ensure_collection("cfg").await.unwrap();
    store
        .save(json!({ "_id": "cfg/main", "a": 1, "o": { "x": 1 } }), SaveOptions::new())
        .await
        .unwrap();

    // Update (défaut) : fusion profonde
    store
        .save(json!({ "_id": "cfg/main", "b": 2, "o": { "y": 2 } }), SaveOptions::new())
        .await
        .unwrap();
    let doc = store.fetch("cfg/main".into()).await.unwrap().unwrap();
    assert_eq!(doc["a"], 1);
    assert_eq!(doc["o"], json!({ "x": 1, "y": 2 }));

    // Ignore : inchangé
    store
        .save(
            json!({ "_id": "cfg/main", "a": 99 }),
            SaveOptions::overwrite(OverwriteMode::Ignore),
        )
        .await
        .unwrap();
    assert_eq!(store.fetch("cfg/main".into()).await.unwrap().unwrap()["a"], 1);

    // Conflict : erreur typée
    let res = store
        .save(json!({ "_id": "cfg/main" }), SaveOptions::overwrite(OverwriteMode::Conflict))
        .await;
    assert!(matches!(res, Err(StoreError::DocumentExists(_))));

    // Replace : remplacement intégral
    store
        .save(
            json!({ "_id": "cfg/main", "only": true }),
            SaveOptions::overwrite(OverwriteMode::Replace),
        )
        .await
        .unwrap();
    let doc = store.fetch("cfg/main".into()).await.unwrap().unwrap();
    assert_eq!(doc.get("a"), None);
    assert_eq!(doc["only"], true);
}

async fn save_all_stops_at_first_failure(store: &dyn DocumentStore) {
    store.ensure_collection("batch").await.unwrap();
    let res = store
        .save_all(
            vec![
                json!({ "_id": "batch/1" }),
                json!({ "no_collection": true }),
                json!({ "_id": "batch/3" }),
            ],
            SaveOptions::new(),
        )
        .await;
    assert!(matches!(res, Err(StoreError::InvalidSelector(_))));
    assert!(store.has("batch/1".into()).await.unwrap());
    assert!(!store.has("batch/3".into()).await.unwrap());
}

async fn run_contract(store: &dyn DocumentStore) {
    save_fetch_round_trip(store).await;
    delete_is_true_once(store).await;
    numeric_key_is_kept(store).await;
    ensure_twice_keeps_contents(store).await;
    empty_collection_sentinel(store).await;
    overwrite_modes(store).await;
    save_all_stops_at_first_failure(store).await;
}

#[tokio::test]
async fn memory_store_honours_contract() {
    let env = init_test_env().await;
    run_contract(&env.memory).await;
}

#[tokio::test]
async fn file_store_honours_contract() {
    let env = init_test_env().await;
    run_contract(&env.file).await;
}

#[tokio::test]
async fn remote_store_honours_contract() {
    let env = init_test_env().await;
    run_contract(&env.remote).await;
}

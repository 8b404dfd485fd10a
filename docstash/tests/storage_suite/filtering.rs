// FICHIER : docstash/tests/storage_suite/filtering.rs

use crate::init_test_env;
use docstash::query::{FilterSpec, PropertyFilter};
use docstash::storage::{DocumentStore, SaveOptions, StorageSystem, WithCollections, WithQueries};
use docstash::utils::prelude::*;

async fn seed_values(store: &dyn DocumentStore) {
    store.ensure_collection("values").await.unwrap();
    let docs = (1..=8)
        .map(|v| {
            let parity = if v % 2 == 0 { "even" } else { "odd" };
            json!({
                "_collection": "values",
                "value": v,
                "name": format!("item-{}", v),
                "tags": [parity],
            })
        })
        .collect();
    store.save_all(docs, SaveOptions::new()).await.unwrap();
}

fn sorted_values(docs: &[docstash::Document]) -> Vec<i64> {
    let mut out: Vec<i64> = docs.iter().filter_map(|d| d["value"].as_i64()).collect();
    out.sort();
    out
}

async fn check_filters(store: &dyn DocumentStore) {
    seed_values(store).await;

    let lt5 = FilterSpec::new().with("value", PropertyFilter::new().lt(5));
    let found = store.fetch_all("values", Some(&lt5)).await.unwrap();
    assert_eq!(sorted_values(&found), vec![1, 2, 3, 4]);

    let even_above_4 = FilterSpec::new()
        .with("value", PropertyFilter::new().gt(4))
        .with("tags", PropertyFilter::new().has("even"));
    let found = store.fetch_all("values", Some(&even_above_4)).await.unwrap();
    assert_eq!(sorted_values(&found), vec![6, 8]);

    let by_name = FilterSpec::new().with("name", PropertyFilter::new().like("item-[13]"));
    let found = store.fetch_all("values", Some(&by_name)).await.unwrap();
    assert_eq!(sorted_values(&found), vec![1, 3]);

    assert_eq!(store.fetch_all("values", None).await.unwrap().len(), 8);
    assert!(store.fetch_all("nothing-here", Some(&lt5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn filters_behave_identically_on_every_backend() {
    let env = init_test_env().await;
    check_filters(&env.memory).await;
    check_filters(&env.file).await;
    check_filters(&env.remote).await;
}

#[tokio::test]
async fn wire_shaped_filters_are_accepted() {
    let env = init_test_env().await;
    seed_values(&env.memory).await;

    let spec: FilterSpec = serde_json::from_value(json!({
        "value": { "in": [2, 3, 10], "notEq": 3 },
        "name": { "is": "string", "empty": false, "someFutureOp": 1 }
    }))
    .unwrap();
    let found = env.memory.fetch_all("values", Some(&spec)).await.unwrap();
    assert_eq!(sorted_values(&found), vec![2]);
}

#[tokio::test]
async fn nested_paths_and_missing_properties() {
    let env = init_test_env().await;
    let store = &env.memory;
    store
        .save_all(
            vec![
                json!({ "_id": "posts/a", "meta": { "tags": ["x", "y"], "score": 3 } }),
                json!({ "_id": "posts/b", "meta": { "score": 9 } }),
                json!({ "_id": "posts/c" }),
            ],
            SaveOptions::new(),
        )
        .await
        .unwrap();

    let has_x = FilterSpec::new().with("meta.tags", PropertyFilter::new().has("x"));
    let found = store.fetch_all("posts", Some(&has_x)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["_key"], "a");

    let no_meta = FilterSpec::new().with("meta", PropertyFilter::new().is("empty"));
    let found = store.fetch_all("posts", Some(&no_meta)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["_key"], "c");

    let first_tag = FilterSpec::new().with("meta.tags.0", PropertyFilter::new().equals("x"));
    assert_eq!(store.fetch_all("posts", Some(&first_tag)).await.unwrap().len(), 1);
}

// FICHIER : docstash/tests/storage_suite/identity_resolution.rs

use docstash::identity::{self, Selector, KEY_ALPHABET, KEY_LENGTH};
use docstash::utils::prelude::*;
use std::collections::HashSet;

#[test]
fn every_selector_form_resolves_to_the_same_triple() {
    let from_path = identity::resolve(&Selector::Path("books/dune")).unwrap();

    let forms = vec![
        json!("books/dune"),
        json!({ "_id": "books/dune" }),
        json!({ "_collection": "books", "_key": "dune" }),
        json!({ "_id": "books/dune", "_collection": "books", "_key": "dune", "title": "Dune" }),
    ];
    for form in forms {
        let triple = identity::resolve(&(&form).into()).unwrap();
        assert_eq!(triple, from_path, "forme : {}", form);
    }
}

#[test]
fn bare_collection_yields_fresh_valid_keys() {
    let mut seen = HashSet::new();
    for _ in 0..50 {
        let t = identity::resolve(&"books".into()).unwrap();
        assert_eq!(t.key.len(), KEY_LENGTH);
        assert!(t.key.bytes().all(|b| KEY_ALPHABET.contains(&b)));
        assert!(t.is_path_safe());
        assert!(seen.insert(t.key));
    }
}

#[test]
fn resolution_is_idempotent() {
    let first = identity::resolve(&"books".into()).unwrap();
    let second = identity::resolve(&(&first).into()).unwrap();
    let third = identity::resolve(&Selector::Path(&second.id)).unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn invalid_only_without_collection() {
    assert!(identity::resolve(&"books/".into()).is_ok());
    assert!(identity::resolve(&(&json!({ "_collection": "books", "_key": "" })).into()).is_ok());

    for bad in [json!({ "_key": "dune" }), json!(""), json!(true), json!([])] {
        let res = identity::resolve(&(&bad).into());
        assert!(
            matches!(res, Err(StoreError::InvalidSelector(_))),
            "{} devrait être rejeté",
            bad
        );
    }
}

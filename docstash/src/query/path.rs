// FICHIER : docstash/src/query/path.rs

use serde_json::{Map, Value};

/// Lit une propriété imbriquée : `a.b.c`, `tags.0` ou `items[2].name`.
///
/// `None` signifie "indéfini" (chemin absent), à distinguer de `Some(Value::Null)`.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }

    let mut current = doc;
    for part in segments(path) {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Variante de [`lookup`] partant d'un document déjà déballé.
pub fn lookup_map<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.find(['.', '[']) {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    };
    if head.is_empty() {
        return None;
    }
    lookup(doc.get(head)?, rest)
}

/// Découpe `a.b[0].c` en `["a", "b", "0", "c"]`.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['.', '[', ']']).filter(|s| !s.is_empty())
}

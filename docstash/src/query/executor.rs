// FICHIER : docstash/src/query/executor.rs

use crate::query::{glob, path, FilterSpec, Operator, TypeTag};
use crate::utils::prelude::*;
use regex::Regex;
use std::cmp::Ordering;

/// Une condition élémentaire `(chemin, opérateur, cible)`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub path: String,
    pub op: Operator,
    pub target: Value,
    // Motif `like` précompilé ; `None` si la cible n'est pas un motif valide.
    pattern: Option<Regex>,
}

impl Clause {
    pub fn new(path: impl Into<String>, op: Operator, target: Value) -> Self {
        let pattern = match op {
            Operator::Like => compile_pattern(&target),
            _ => None,
        };
        Self {
            path: path.into(),
            op,
            target,
            pattern,
        }
    }

    /// Évalue la clause sur un document. Ne lève jamais d'erreur :
    /// une comparaison impossible fait simplement échouer la clause.
    pub fn matches(&self, doc: &Value) -> bool {
        self.test(path::lookup(doc, &self.path))
    }

    pub fn matches_map(&self, doc: &Map<String, Value>) -> bool {
        self.test(path::lookup_map(doc, &self.path))
    }

    fn test(&self, value: Option<&Value>) -> bool {
        let target = &self.target;

        match self.op {
            Operator::Is => type_matches(value, target),
            Operator::IsNot => !type_matches(value, target),
            Operator::Eq => value.is_some_and(|v| deep_equal(v, target)),
            Operator::NotEq => !value.is_some_and(|v| deep_equal(v, target)),
            Operator::Empty => target.as_bool() == Some(is_empty(value)),
            Operator::Gt => compare(value, target) == Some(Ordering::Greater),
            Operator::Lt => compare(value, target) == Some(Ordering::Less),
            Operator::In => match target {
                Value::Array(list) => contains(list, value),
                _ => false,
            },
            Operator::NotIn => match target {
                Value::Array(list) => !contains(list, value),
                _ => false,
            },
            Operator::Has => match value {
                Some(Value::Array(list)) => contains(list, Some(target)),
                _ => false,
            },
            Operator::NotHas => match value {
                Some(Value::Array(list)) => !contains(list, Some(target)),
                _ => false,
            },
            Operator::Like => match (value.and_then(stringable), &self.pattern) {
                (Some(text), Some(re)) => re.is_match(&text),
                _ => false,
            },
        }
    }
}

/// Prédicat compilé : conjonction de clauses.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    clauses: Vec<Clause>,
}

impl CompiledFilter {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Court-circuite sur la première clause en échec.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(doc))
    }

    /// Variante pour un document déjà sous forme de map.
    pub fn matches_map(&self, doc: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|c| c.matches_map(doc))
    }
}

/// Transforme une spécification en prédicat réutilisable.
/// Les noms d'opérateurs inconnus sont ignorés.
pub fn compile(spec: &FilterSpec) -> CompiledFilter {
    let mut clauses = Vec::new();
    for (prop, filter) in spec.properties() {
        for (name, target) in filter.entries() {
            match Operator::from_name(name) {
                Some(op) => clauses.push(Clause::new(prop, op, target.clone())),
                None => debug!(path = prop, operator = name, "opérateur inconnu ignoré"),
            }
        }
    }
    CompiledFilter { clauses }
}

/// Compile puis évalue en une passe. Préférer [`compile`] pour un scan.
pub fn matches(doc: &Value, spec: &FilterSpec) -> bool {
    compile(spec).matches(doc)
}

// --- PRIMITIVES DE COMPARAISON ---

fn compile_pattern(target: &Value) -> Option<Regex> {
    let source = stringable(target)?;
    match glob::compile(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            debug!(pattern = %source, error = %e, "motif like invalide");
            None
        }
    }
}

fn type_matches(value: Option<&Value>, target: &Value) -> bool {
    match stringable(target) {
        Some(tag) => TypeTag::of(value).name().eq_ignore_ascii_case(&tag),
        None => false,
    }
}

/// Égalité profonde ; les nombres sont comparés numériquement (`1 == 1.0`).
fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| deep_equal(l, r)))
        }
        _ => a == b,
    }
}

fn contains(list: &[Value], value: Option<&Value>) -> bool {
    match value {
        Some(v) => list.iter().any(|item| deep_equal(item, v)),
        None => false,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Nombres entre eux, chaînes entre elles ; tout autre couple est incomparable.
fn compare(value: Option<&Value>, target: &Value) -> Option<Ordering> {
    match (value?, target) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Forme textuelle des primitives non nulles.
fn stringable(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// FICHIER : docstash/src/query/mod.rs

//! Moteur de filtres déclaratifs par propriété

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod executor;
pub mod glob;
pub mod path;

pub use executor::{compile, matches, Clause, CompiledFilter};

/// Opérateurs reconnus dans un `PropertyFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Is,
    IsNot,
    Eq,
    NotEq,
    Empty,
    Gt,
    Lt,
    In,
    NotIn,
    Has,
    NotHas,
    Like,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Operator::Is,
        Operator::IsNot,
        Operator::Eq,
        Operator::NotEq,
        Operator::Empty,
        Operator::Gt,
        Operator::Lt,
        Operator::In,
        Operator::NotIn,
        Operator::Has,
        Operator::NotHas,
        Operator::Like,
    ];

    /// Nom de l'opérateur sur le fil (`notEq`, `isNot`...).
    pub fn name(self) -> &'static str {
        match self {
            Operator::Is => "is",
            Operator::IsNot => "isNot",
            Operator::Eq => "eq",
            Operator::NotEq => "notEq",
            Operator::Empty => "empty",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Has => "has",
            Operator::NotHas => "notHas",
            Operator::Like => "like",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Étiquette de type d'une valeur, pour `is` / `isNot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Empty,
    Null,
    Array,
    Object,
    String,
    Number,
    Boolean,
}

impl TypeTag {
    /// Prédicats ordonnés : le premier qui répond gagne.
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => TypeTag::Empty,
            Some(Value::Null) => TypeTag::Null,
            Some(Value::Array(_)) => TypeTag::Array,
            Some(Value::Object(_)) => TypeTag::Object,
            Some(Value::String(_)) => TypeTag::String,
            Some(Value::Number(_)) => TypeTag::Number,
            Some(Value::Bool(_)) => TypeTag::Boolean,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Empty => "empty",
            TypeTag::Null => "null",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
        }
    }
}

/// Ensemble `opérateur -> cible` pour une propriété.
///
/// Stocké tel quel (forme JSON) : les clés inconnues sont conservées et
/// ignorées à la compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyFilter(Map<String, Value>);

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, op: Operator, target: impl Into<Value>) -> Self {
        self.0.insert(op.name().to_string(), target.into());
        self
    }

    pub fn is(self, tag: &str) -> Self {
        self.with(Operator::Is, tag)
    }
    pub fn is_not(self, tag: &str) -> Self {
        self.with(Operator::IsNot, tag)
    }
    pub fn equals(self, target: impl Into<Value>) -> Self {
        self.with(Operator::Eq, target)
    }
    pub fn not_equals(self, target: impl Into<Value>) -> Self {
        self.with(Operator::NotEq, target)
    }
    pub fn empty(self, expected: bool) -> Self {
        self.with(Operator::Empty, expected)
    }
    pub fn gt(self, target: impl Into<Value>) -> Self {
        self.with(Operator::Gt, target)
    }
    pub fn lt(self, target: impl Into<Value>) -> Self {
        self.with(Operator::Lt, target)
    }
    pub fn within(self, targets: Vec<Value>) -> Self {
        self.with(Operator::In, Value::Array(targets))
    }
    pub fn not_within(self, targets: Vec<Value>) -> Self {
        self.with(Operator::NotIn, Value::Array(targets))
    }
    pub fn has(self, target: impl Into<Value>) -> Self {
        self.with(Operator::Has, target)
    }
    pub fn not_has(self, target: impl Into<Value>) -> Self {
        self.with(Operator::NotHas, target)
    }
    pub fn like(self, pattern: &str) -> Self {
        self.with(Operator::Like, pattern)
    }

    /// Paires brutes `(nom, cible)`, opérateurs inconnus compris.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Spécification de filtre : `chemin de propriété -> PropertyFilter`.
/// Toutes les conditions sont combinées en ET.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeMap<String, PropertyFilter>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, filter: PropertyFilter) -> Self {
        self.0.insert(path.into(), filter);
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyFilter)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compile la spécification en prédicat réutilisable.
    pub fn compile(&self) -> CompiledFilter {
        compile(self)
    }
}

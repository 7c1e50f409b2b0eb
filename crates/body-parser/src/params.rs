//! Symbol-keyed request parameters.
//!
//! A parser returns a raw [`serde_json::Value`]. Handlers read request data through [`Params`] instead, where every
//! mapping key at every nesting level is a [`Symbol`]. A parsed body that is not a mapping (a list, a scalar) is
//! kept under the single fallback key [`FALLBACK_KEY`].

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::{Deref, Index};
use std::sync::Arc;

/// The key holding a parsed body that is not a mapping
pub const FALLBACK_KEY: &str = "_";

/// An immutable, cheaply cloneable parameter key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(Arc::from(name))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A parameter value: the structure of a parsed body with every mapping key symbolized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Param>),
    Map(Params),
}

impl Param {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Param::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Param::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Param]> {
        match self {
            Param::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Params> {
        match self {
            Param::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }
}

impl From<&Value> for Param {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(*b),
            Value::Number(n) => Param::Number(n.clone()),
            Value::String(s) => Param::String(s.clone()),
            Value::Array(items) => Param::List(items.iter().map(Param::from).collect()),
            Value::Object(map) => Param::Map(symbolize(map)),
        }
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::String(s.to_owned())
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Number(n.into())
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<Params> for Param {
    fn from(params: Params) -> Self {
        Param::Map(params)
    }
}

/// Symbol-keyed request parameters, written by the body parser into the request context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params {
    inner: BTreeMap<Symbol, Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the parameters for a parsed body.
    ///
    /// A mapping is symbolized at every nesting level, including mappings held in lists. Any other value is
    /// stored under [`FALLBACK_KEY`].
    pub fn from_parsed(parsed: &Value) -> Self {
        match parsed {
            Value::Object(map) => symbolize(map),
            other => Params::fallback_of(Param::from(other)),
        }
    }

    fn fallback_of(value: Param) -> Self {
        let mut params = Params::new();
        params.insert(FALLBACK_KEY, value);
        params
    }

    pub fn insert(&mut self, key: impl Into<Symbol>, value: impl Into<Param>) -> Option<Param> {
        self.inner.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Param> {
        self.inner.get(key.as_ref())
    }

    /// Follows `path` through nested mappings.
    pub fn dig(&self, path: &[&str]) -> Option<&Param> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.get(first)?, |param, key| param.as_map()?.get(key))
    }

    /// Returns the value stored under [`FALLBACK_KEY`], present when the parsed body was not a mapping
    pub fn fallback(&self) -> Option<&Param> {
        self.get(FALLBACK_KEY)
    }

    #[inline]
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner.contains_key(key.as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Symbol, Param> {
        self.inner.iter()
    }

    /// Deserializes the parameters into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

impl<K: AsRef<str>> Index<K> for Params {
    type Output = Param;

    fn index(&self, key: K) -> &Param {
        match self.get(key.as_ref()) {
            Some(param) => param,
            None => panic!("no param named `{}`", key.as_ref()),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a Symbol, &'a Param);
    type IntoIter = btree_map::Iter<'a, Symbol, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: Into<Symbol>, V: Into<Param>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params { inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

fn symbolize(map: &serde_json::Map<String, Value>) -> Params {
    map.iter().map(|(key, value)| (Symbol::new(key), Param::from(value))).collect()
}

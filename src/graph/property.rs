//! Attribute value types for nodes, edges and the graph itself
//!
//! `AttrValue` is the dynamically typed value; `AttrBag` is the
//! insertion-ordered container attached to every node, every edge and the
//! graph. Edge bags are shared between the adjacency entries that refer to
//! the same edge through [`SharedAttrs`].

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Dynamically typed attribute value
///
/// Supports:
/// - Null
/// - Boolean
/// - Integer (i64)
/// - Float (f64)
/// - String
/// - Array (Vec<AttrValue>)
/// - Map (nested AttrBag)
///
/// Deserializes from plain JSON (untagged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<AttrValue>),
    Map(AttrBag),
}

impl AttrValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrBag> {
        match self {
            AttrValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "Null",
            AttrValue::Boolean(_) => "Boolean",
            AttrValue::Integer(_) => "Integer",
            AttrValue::Float(_) => "Float",
            AttrValue::String(_) => "String",
            AttrValue::Array(_) => "Array",
            AttrValue::Map(_) => "Map",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Boolean(b) => write!(f, "{}", b),
            AttrValue::Integer(i) => write!(f, "{}", i),
            AttrValue::Float(fl) => write!(f, "{}", fl),
            AttrValue::String(s) => write!(f, "\"{}\"", s),
            AttrValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            AttrValue::Map(map) => write!(f, "{}", map),
        }
    }
}

// Convenience conversions
impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Integer(i as i64)
    }
}

impl From<u64> for AttrValue {
    fn from(i: u64) -> Self {
        AttrValue::Integer(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Boolean(b)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(arr: Vec<AttrValue>) -> Self {
        AttrValue::Array(arr)
    }
}

impl From<AttrBag> for AttrValue {
    fn from(map: AttrBag) -> Self {
        AttrValue::Map(map)
    }
}

/// Insertion-ordered attribute container.
///
/// Equality ignores insertion order; iteration and serialization follow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrBag(IndexMap<String, AttrValue, FxBuildHasher>);

impl AttrBag {
    pub fn new() -> Self {
        AttrBag(IndexMap::default())
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.0.get_mut(key)
    }

    /// Set a value, returning the one it replaced. A replaced key keeps its
    /// original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge `other` into this bag in place; colliding keys are overwritten.
    pub fn merge(&mut self, other: &AttrBag) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Owned variant of [`AttrBag::merge`].
    pub fn merge_owned(&mut self, other: AttrBag) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl fmt::Display for AttrBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, val)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, val)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttrBag(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<AttrValue>> Extend<(K, V)> for AttrBag {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for AttrBag {
    type Item = (String, AttrValue);
    type IntoIter = indexmap::map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Edge attribute bag shared by every adjacency entry of one edge.
///
/// Writes through a handle obtained from either endpoint are visible from
/// the other. Handle writes do not advance the store revision.
pub type SharedAttrs = Arc<RwLock<AttrBag>>;

pub(crate) fn share(bag: AttrBag) -> SharedAttrs {
    Arc::new(RwLock::new(bag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_types() {
        assert_eq!(AttrValue::String("test".to_string()).type_name(), "String");
        assert_eq!(AttrValue::Integer(42).type_name(), "Integer");
        assert_eq!(AttrValue::Float(3.5).type_name(), "Float");
        assert_eq!(AttrValue::Boolean(true).type_name(), "Boolean");
        assert_eq!(AttrValue::Array(vec![]).type_name(), "Array");
        assert_eq!(AttrValue::Map(AttrBag::new()).type_name(), "Map");
        assert_eq!(AttrValue::Null.type_name(), "Null");
    }

    #[test]
    fn test_attr_value_conversions() {
        let s: AttrValue = "hello".into();
        assert_eq!(s.as_string(), Some("hello"));

        let i: AttrValue = 42i64.into();
        assert_eq!(i.as_integer(), Some(42));
        assert_eq!(i.as_float(), Some(42.0));

        let b: AttrValue = true.into();
        assert_eq!(b.as_boolean(), Some(true));
    }

    #[test]
    fn test_bag_merge_overwrites() {
        let mut bag: AttrBag = [("color", "red"), ("size", "small")].into_iter().collect();
        let update: AttrBag = [("color", AttrValue::from("blue")), ("weight", 2.into())]
            .into_iter()
            .collect();
        bag.merge(&update);

        assert_eq!(bag.len(), 3);
        assert_eq!(bag.get("color").unwrap().as_string(), Some("blue"));
        let keys: Vec<&String> = bag.keys().collect();
        assert_eq!(keys, vec!["color", "size", "weight"]);
    }

    #[test]
    fn test_bag_equality_ignores_order() {
        let a: AttrBag = [("x", 1), ("y", 2)].into_iter().collect();
        let b: AttrBag = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bag_remove_keeps_order() {
        let mut bag: AttrBag = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        bag.remove("a");
        let keys: Vec<&String> = bag.keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let json = r#"{"z":1,"a":[true,null,2.5],"m":{"k":"v"}}"#;
        let bag: AttrBag = serde_json::from_str(json).unwrap();
        assert_eq!(bag.get("a").unwrap().as_array().unwrap().len(), 3);
        let nested = bag.get("m").unwrap().as_map().unwrap();
        assert_eq!(nested.get("k").unwrap().as_string(), Some("v"));
        assert_eq!(serde_json::to_string(&bag).unwrap(), json);
    }

    #[test]
    fn test_shared_attrs_alias() {
        let handle = share(AttrBag::new());
        let other = Arc::clone(&handle);
        other.write().insert("weight", 3);
        assert_eq!(handle.read().get("weight").unwrap().as_integer(), Some(3));
    }
}

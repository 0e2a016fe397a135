//! Insertion-ordered column/value mappings used as insert data, update data and
//! where clauses.

use crate::value::Value;

/// An ordered mapping from column name to [`Value`].
///
/// Keys enumerate in insertion order, and the statement builders rely on that:
/// the `i`-th key always lines up with the `i`-th bound value.
///
/// Column names are written into SQL verbatim. Never build a `Record` key from
/// untrusted input.
///
/// # Example
///
/// ```
/// use duosql::{Record, record};
///
/// let a = Record::new().set("title", "hello").set("body", "world");
/// let b = record! { "title" => "hello", "body" => "world" };
/// assert_eq!(a, b);
/// assert_eq!(a.keys().collect::<Vec<_>>(), ["title", "body"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, consuming and returning the record.
    ///
    /// Setting an existing key replaces its value without moving it.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `other` has the same keys in the same order.
    pub fn same_columns(&self, other: &Record) -> bool {
        self.len() == other.len() && self.keys().zip(other.keys()).all(|(a, b)| a == b)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let r = Record::new().set("b", 1).set("a", 2).set("c", 3);
        assert_eq!(r.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(
            r.values().cloned().collect::<Vec<_>>(),
            [Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn overwrite_keeps_position() {
        let r = Record::new().set("a", 1).set("b", 2).set("a", 9);
        assert_eq!(r.len(), 2);
        assert_eq!(r.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::Int(9)));
    }

    #[test]
    fn same_columns_is_order_sensitive() {
        let a = Record::from([("x", 1), ("y", 2)]);
        let b = Record::from([("x", 3), ("y", 4)]);
        let c = Record::from([("y", 1), ("x", 2)]);
        assert!(a.same_columns(&b));
        assert!(!a.same_columns(&c));
        assert!(!a.same_columns(&Record::from([("x", 1)])));
    }
}

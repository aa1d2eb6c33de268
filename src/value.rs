//! The dynamic values record fields hold.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::{fmt, mem};

use indexmap::IndexMap;

use crate::{conditions::Condition, num::Number, records::Record, symbols::Symbol};

/// An insertion-ordered mapping from values to values.
pub type Map = IndexMap<Value, Value>;

/// Any value a record field can hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(Number),
    Character(char),
    String(String),
    Symbol(Symbol),
    Vector(Vec<Value>),
    Map(Map),
    Record(Box<Record>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Character(_) => "character",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Vector(_) => "vector",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    /// One step of a `dig` traversal: keyed access into this value.
    ///
    /// Vectors are indexed by number, maps by any value, records by field
    /// name or position. `None` for an absent entry or a value that does not
    /// support keyed access at all.
    pub fn index(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Vector(items) => match key {
                Value::Number(n) => items.get(n.to_index().ok()?),
                _ => None,
            },
            Self::Map(map) => map.get(key),
            Self::Record(record) => record.lookup(key),
            _ => None,
        }
    }
}

// Maps compare order-insensitively, so their entry hashes are combined with
// an order-independent XOR to keep Hash consistent with Eq.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Boolean(b) => b.hash(state),
            Self::Number(n) => n.hash(state),
            Self::Character(c) => c.hash(state),
            Self::String(s) => s.hash(state),
            Self::Symbol(sym) => sym.hash(state),
            Self::Vector(items) => items.hash(state),
            Self::Map(map) => {
                map.len().hash(state);
                let mut combined = 0u64;
                for (key, val) in map {
                    let mut entry = DefaultHasher::new();
                    key.hash(&mut entry);
                    val.hash(&mut entry);
                    combined ^= entry.finish();
                }
                combined.hash(state);
            }
            Self::Record(record) => record.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Number(Number::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Number(Number::from(f))
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Character(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&'_ str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Vector(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(Box::new(record))
    }
}

impl<'a> TryFrom<&'a Value> for bool {
    type Error = Condition;

    fn try_from(v: &'a Value) -> Result<bool, Self::Error> {
        match v {
            Value::Boolean(b) => Ok(*b),
            x => Err(Condition::type_error("boolean", x.type_name())),
        }
    }
}

impl<'a> TryFrom<&'a Value> for i64 {
    type Error = Condition;

    fn try_from(v: &'a Value) -> Result<i64, Self::Error> {
        match v {
            Value::Number(Number::FixedInteger(i)) => Ok(*i),
            x => Err(Condition::type_error("integer", x.type_name())),
        }
    }
}

impl<'a> TryFrom<&'a Value> for &'a str {
    type Error = Condition;

    fn try_from(v: &'a Value) -> Result<&'a str, Self::Error> {
        match v {
            Value::String(s) => Ok(s),
            x => Err(Condition::type_error("string", x.type_name())),
        }
    }
}

impl<'a> TryFrom<&'a Value> for &'a Number {
    type Error = Condition;

    fn try_from(v: &'a Value) -> Result<&'a Number, Self::Error> {
        match v {
            Value::Number(n) => Ok(n),
            x => Err(Condition::type_error("number", x.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Character(c) => write!(f, "'{c}'"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Symbol(sym) => write!(f, "{sym}"),
            Self::Vector(items) => {
                write!(f, "[")?;
                let mut iter = items.iter().peekable();
                while let Some(item) = iter.next() {
                    write!(f, "{item}")?;
                    if iter.peek().is_some() {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                let mut iter = map.iter().peekable();
                while let Some((key, val)) = iter.next() {
                    write!(f, "{key}: {val}")?;
                    if iter.peek().is_some() {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
            Self::Record(record) => write!(f, "{record}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_steps() {
        let vector = Value::from(vec![Value::from(10), Value::from(20)]);
        assert_eq!(vector.index(&Value::from(1)), Some(&Value::from(20)));
        assert_eq!(vector.index(&Value::from(2)), None);
        assert_eq!(vector.index(&Value::from("1")), None);

        let mut map = Map::new();
        map.insert(Value::from("answer"), Value::from(42));
        let map = Value::from(map);
        assert_eq!(map.index(&Value::from("answer")), Some(&Value::from(42)));
        assert_eq!(map.index(&Value::from("question")), None);

        assert_eq!(Value::Nil.index(&Value::from(0)), None);
    }

    #[test]
    fn test_map_hash_ignores_insertion_order() {
        fn hash_of(value: &Value) -> u64 {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }

        let mut forward = Map::new();
        forward.insert(Value::from("a"), Value::from(1));
        forward.insert(Value::from("b"), Value::from(2));

        let mut backward = Map::new();
        backward.insert(Value::from("b"), Value::from(2));
        backward.insert(Value::from("a"), Value::from(1));

        assert_eq!(Value::from(forward.clone()), Value::from(backward.clone()));
        assert_eq!(hash_of(&Value::from(forward)), hash_of(&Value::from(backward)));
    }

    #[test]
    fn test_display() {
        let vector = Value::from(vec![Value::from(1), Value::from("two"), Value::Nil]);
        assert_eq!(vector.to_string(), "[1, \"two\", nil]");
    }
}
